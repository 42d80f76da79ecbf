mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::{LoadingCase, ProjectFile, SectionGeometry, SectionSpec};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use xtract_core::extract::{extract_from_source, Section};
use xtract_core::geom::Vec2;
use xtract_core::model::{EntitySource, Selection};
use xtract_core::project::Project;
use xtract_core::section::SectionModel;
use xtract_core::template::TemplateSet;
use xtract_import_dxf::DxfSource;

#[derive(Debug, Parser)]
#[command(name = "xtract")]
#[command(about = "Fiber-section geometry from CAD drawings to XTRACT command streams.")]
struct Cli {
    /// Log extraction details (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the command stream described by a project file.
    Build {
        project: PathBuf,
        #[arg(long)]
        templates: PathBuf,
        /// Drawing for `cad` sections; overrides the project's `drawing`.
        #[arg(long)]
        drawing: Option<PathBuf>,
        /// Output file; defaults to `<project name>.xpj`.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory receiving one JSON dump per extracted section.
        #[arg(long)]
        dump_sections: Option<PathBuf>,
    },
    /// Extract one section from a drawing and print it as JSON.
    Extract {
        drawing: PathBuf,
        #[arg(long, default_value = "section")]
        name: String,
        /// Block holding the section.
        #[arg(long, conflicts_with = "window")]
        block: Option<String>,
        /// Window `xmin,ymin,xmax,ymax` the section lies in.
        #[arg(long, value_parser = parse_window)]
        window: Option<Selection>,
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Build {
            project,
            templates,
            drawing,
            output,
            dump_sections,
        } => build(
            &project,
            &templates,
            drawing.as_deref(),
            output.as_deref(),
            dump_sections.as_deref(),
        ),
        Command::Extract {
            drawing,
            name,
            block,
            window,
            report,
        } => {
            let selection = match (block, window) {
                (Some(block), _) => Selection::Block(block),
                (None, Some(window)) => window,
                (None, None) => Selection::All,
            };
            extract(&drawing, &name, &selection, report.as_deref())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_window(s: &str) -> Result<Selection, String> {
    let v = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("window coordinate: {e}"))?;
    let [x0, y0, x1, y1] = v[..] else {
        return Err(format!("expected xmin,ymin,xmax,ymax, got {} value(s)", v.len()));
    };
    Ok(Selection::Window {
        min: Vec2::new(x0.min(x1), y0.min(y1)),
        max: Vec2::new(x0.max(x1), y0.max(y1)),
    })
}

fn build(
    project_path: &Path,
    templates_path: &Path,
    drawing: Option<&Path>,
    output: Option<&Path>,
    dump_sections: Option<&Path>,
) -> Result<()> {
    ensure_input_file(project_path)?;
    ensure_input_file(templates_path)?;
    let templates = config::load_templates(templates_path)?;
    let spec = ProjectFile::load(project_path)?;

    let mut source = match drawing.map(Path::to_path_buf).or_else(|| spec.drawing.clone()) {
        Some(path) => {
            ensure_input_file(&path)?;
            Some(DxfSource::load(&path)?)
        }
        None if spec.needs_drawing() => {
            bail!("project has cad sections but no drawing; pass --drawing or set `drawing`")
        }
        None => None,
    };

    let assembly = assemble(
        &templates,
        &spec,
        source.as_mut().map(|s| s as &mut dyn EntitySource),
    )?;

    let default_output = PathBuf::from(format!("{}.xpj", spec.name));
    let path = output.unwrap_or(&default_output);
    write_file(path, &assembly.stream).with_context(|| format!("write output: {path:?}"))?;
    if let Some(dir) = dump_sections {
        for section in &assembly.extracted {
            dump_section(dir, section)?;
        }
    }
    info!(output = ?path, sections = spec.sections.len(), "command stream written");
    Ok(())
}

/// Command stream plus the sections read from the drawing, kept for dumping.
struct Assembly {
    stream: String,
    extracted: Vec<Section>,
}

/// Renders the whole project in memory; nothing is written unless every
/// section succeeds.
fn assemble(
    templates: &TemplateSet,
    spec: &ProjectFile,
    mut source: Option<&mut dyn EntitySource>,
) -> Result<Assembly> {
    let mut extracted = Vec::new();
    let mut project = Project::new(templates, &spec.name)?;
    project.add_materials(&spec.materials)?;

    for sec in &spec.sections {
        let mut model = SectionModel::new(templates, sec.name.clone(), sec.boundary);
        match &sec.geometry {
            SectionGeometry::HollowRectangle { dims, materials } => {
                let [concrete, steel] = materials;
                model
                    .hollow_rectangle(dims, [concrete.as_str(), steel.as_str()])
                    .with_context(|| format!("section {:?}", sec.name))?;
            }
            SectionGeometry::Cad {
                selection,
                mesh_size,
            } => {
                let Some(source) = source.as_deref_mut() else {
                    bail!("section {:?} needs a drawing", sec.name);
                };
                let section = extract_from_source(source, &sec.name, selection)
                    .with_context(|| format!("extract section {:?}", sec.name))?;
                model
                    .build_from_extraction(&section, *mesh_size)
                    .with_context(|| format!("section {:?}", sec.name))?;
                extracted.push(section);
            }
        }
        add_loadings(&mut model, sec)?;
        project.add_section(&model)?;
    }

    Ok(Assembly {
        stream: project.command_stream(),
        extracted,
    })
}

fn add_loadings(model: &mut SectionModel<'_>, sec: &SectionSpec) -> Result<()> {
    for case in &sec.loadings {
        match case {
            LoadingCase::MomentCurvature {
                name,
                axial,
                mxx,
                myy,
                inc,
                positive,
            } => model.add_moment_curvature(name, *axial, *mxx, *myy, *inc, *positive)?,
            LoadingCase::PmInteraction {
                name,
                full_or_half,
                angle,
            } => model.add_interaction(name, full_or_half, *angle)?,
            LoadingCase::CapacityOrbit { name, load } => model.add_capacity_orbit(name, *load)?,
        }
    }
    Ok(())
}

fn extract(
    drawing: &Path,
    name: &str,
    selection: &Selection,
    report: Option<&Path>,
) -> Result<()> {
    ensure_input_file(drawing)?;
    let mut source = DxfSource::load(drawing)?;
    let section = extract_from_source(&mut source, name, selection)
        .with_context(|| format!("extract section {name:?}"))?;
    let json = serde_json::to_string_pretty(&section).context("serialize section")?;
    match report {
        Some(path) => {
            write_file(path, &json).with_context(|| format!("write report: {path:?}"))?
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn dump_section(dir: &Path, section: &Section) -> Result<()> {
    let json = serde_json::to_string_pretty(section).context("serialize section")?;
    let path = dir.join(format!("{}.json", section.name));
    write_file(&path, &json).with_context(|| format!("write section dump: {path:?}"))
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    std::fs::write(path, contents)
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => bail!("input is not a file: {input:?}"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
