use anyhow::{anyhow, bail, Context, Result};
use diorama::config::EngineConfig;
use diorama::scene::{Scene, Shape};
use diorama::Editor;
use std::env;
use std::process;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "validate" => {
            let scene_path = args
                .next()
                .ok_or_else(|| anyhow!("validate requires a path: scene_tool validate <scene>"))?;
            cmd_validate(&scene_path)
        }
        "info" => {
            let scene_path =
                args.next().ok_or_else(|| anyhow!("info requires a path: scene_tool info <scene>"))?;
            cmd_info(&scene_path)
        }
        "simulate" => {
            let scene_path = args.next().ok_or_else(|| {
                anyhow!("simulate requires a path: scene_tool simulate <scene> [--steps N] [--out <path>]")
            })?;
            let options = SimulateOptions::parse(args)?;
            cmd_simulate(&scene_path, options)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'")),
    }
}

fn print_usage() {
    eprintln!(
        "Scene Tool

Usage:
  scene_tool validate <scene_path>                      Report clamped values and unknown shapes
  scene_tool info <scene_path>                          Summarize objects and scene context
  scene_tool simulate <scene> [--steps N] [--out <p>]   Headless settle; write the result with --out
  scene_tool help                                       Show this message
"
    );
}

#[derive(Debug, PartialEq)]
struct SimulateOptions {
    steps: usize,
    out: Option<String>,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self { steps: 240, out: None }
    }
}

impl SimulateOptions {
    fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = SimulateOptions::default();
        let mut iter = args.into_iter();
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Use --steps/--out with values.");
            }
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match &flag[2..] {
                "steps" => {
                    options.steps =
                        value.parse::<usize>().with_context(|| format!("Invalid steps '{value}'"))?;
                }
                "out" => options.out = Some(value),
                _ => bail!("Unknown flag '{flag}'. Supported flags: --steps, --out."),
            }
        }
        Ok(options)
    }
}

fn cmd_validate(scene_path: &str) -> Result<()> {
    let bytes = std::fs::read(scene_path).with_context(|| format!("Reading scene file {scene_path}"))?;
    let raw: Scene =
        serde_json::from_slice(&bytes).with_context(|| format!("Parsing scene file {scene_path}"))?;
    let mut issues = Vec::new();
    for (id, object) in &raw.objects {
        let clean = object.physics.sanitized();
        if clean != object.physics {
            issues.push(format!(
                "object {id}: physics clamped (mass {} -> {}, friction {} -> {}, restitution {} -> {})",
                object.physics.mass,
                clean.mass,
                object.physics.friction,
                clean.friction,
                object.physics.restitution,
                clean.restitution,
            ));
        }
        if object.visual.shape == Shape::Unknown {
            issues.push(format!("object {id}: unknown shape, will fall back to a unit box collider"));
        }
        if !object.transform.is_finite() {
            issues.push(format!("object {id}: non-finite transform, will reset to identity"));
        }
    }
    if issues.is_empty() {
        println!("{scene_path}: OK ({} objects)", raw.objects.len());
    } else {
        println!("{scene_path}: {} issue(s)", issues.len());
        for issue in &issues {
            println!("  {issue}");
        }
    }
    Ok(())
}

fn cmd_info(scene_path: &str) -> Result<()> {
    let scene = Scene::load_from_path(scene_path)?;
    println!("objects: {}", scene.objects.len());
    for (id, object) in &scene.objects {
        let p = object.transform.position;
        println!(
            "  {id} shape={} mass={:.3} at ({:.2}, {:.2}, {:.2}){}",
            object.visual.shape.as_str(),
            object.physics.mass,
            p.x,
            p.y,
            p.z,
            object.name.as_deref().map(|n| format!(" name={n}")).unwrap_or_default(),
        );
    }
    let context = &scene.context;
    println!(
        "context: quality={} shadows={} atmosphere={:.2}",
        context.render_quality.label(),
        context.lighting.shadows_enabled,
        context.environment.atmosphere_density,
    );
    if !context.narrative.is_empty() {
        println!("narrative: {}", context.narrative);
    }
    Ok(())
}

fn cmd_simulate(scene_path: &str, options: SimulateOptions) -> Result<()> {
    let scene = Scene::load_from_path(scene_path)?;
    let mut editor = Editor::new(EngineConfig::default());
    editor.load_scene(scene);
    editor.start_simulation();
    for _ in 0..options.steps {
        editor.update();
    }
    editor.pause_simulation();
    println!("simulated {} steps over {} objects", options.steps, editor.scene().objects.len());
    for (id, object) in &editor.scene().objects {
        let p = object.transform.position;
        println!("  {id} settled at ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
    }
    if let Some(out) = options.out {
        editor.scene().save_to_path(&out)?;
        println!("wrote {out}");
    }
    Ok(())
}
