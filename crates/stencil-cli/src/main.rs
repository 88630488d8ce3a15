use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use stencil_common::telemetry::{self, TelemetryConfig};
use stencil_common::{
    AttributeCatalog, AttributeDescriptor, Config, FileStore, PackageSlot, StencilError,
};
use stencil_editor_core::{
    EditableDocument, EditorRope, EditorSession, InsertOutcome, TemplateInsertionEngine,
};

#[derive(Parser)]
#[command(
    version,
    about = "Stencil - build attribute templates from schema packages",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (.json or .toml)
    #[arg(long, global = true, env = "STENCIL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a package can be uploaded
    Check {
        /// Path to the package JSON
        package: PathBuf,

        /// Override the configured nesting ceiling
        #[arg(long)]
        max_level: Option<usize>,
    },
    /// List the attributes of a catalog
    Attributes {
        /// Path to the catalog JSON
        catalog: PathBuf,
    },
    /// Insert attributes into a template
    Build {
        /// Catalog to resolve attribute names against
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Existing template to start from
        #[arg(long)]
        template: Option<PathBuf>,

        /// Initial cursor offset (defaults to the end of the template)
        #[arg(long)]
        cursor: Option<usize>,

        /// Write the template here instead of stdout. A directory gets the
        /// configured export file name.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Attributes to insert, as `Name` or `Parent.Child`
        #[arg(required = true)]
        attributes: Vec<String>,
    },
}

fn main() -> Result<()> {
    init_miette();
    telemetry::init(TelemetryConfig::from_env("stencil"));

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { package, max_level } => {
            check_package(&package, max_level.unwrap_or(config.max_schema_level))?;
        }
        Commands::Attributes { catalog } => {
            list_attributes(&read_catalog(&catalog)?);
        }
        Commands::Build {
            catalog,
            template,
            cursor,
            output,
            attributes,
        } => {
            let catalog = catalog.as_deref().map(read_catalog).transpose()?;
            build_template(
                &config,
                catalog.as_ref(),
                template.as_deref(),
                cursor,
                output.as_deref(),
                &attributes,
            )?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            Ok(Config::load(&FileStore::new(path))?)
        }
        None => Ok(Config::default()),
    }
}

fn read_catalog(path: &Path) -> Result<AttributeCatalog> {
    let text = std::fs::read_to_string(path).into_diagnostic()?;
    Ok(AttributeCatalog::from_json(&text)?)
}

fn check_package(path: &Path, max_level: usize) -> Result<()> {
    let text = std::fs::read_to_string(path).into_diagnostic()?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut slot = PackageSlot::new(max_level);
    let accepted = slot.upload(&name, &text)?;

    println!(
        "{}: ok, {} attributes, nesting level {} (max {})",
        accepted.name,
        accepted.package.attribute_count(),
        accepted.level,
        max_level
    );
    Ok(())
}

fn list_attributes(catalog: &AttributeCatalog) {
    fn print_level<'a>(
        descriptors: impl IntoIterator<Item = &'a AttributeDescriptor>,
        parent: Option<&str>,
        depth: usize,
    ) {
        for d in descriptors {
            println!(
                "{:indent$}{:<24} {:<12} {}",
                "",
                d.label,
                d.display_type(),
                d.template_usage(parent),
                indent = depth * 2
            );
            print_level(d.nested(), Some(d.name.as_str()), depth + 1);
        }
    }

    print_level(catalog, None, 0);
}

fn build_template(
    config: &Config,
    catalog: Option<&AttributeCatalog>,
    template: Option<&Path>,
    cursor: Option<usize>,
    output: Option<&Path>,
    attributes: &[String],
) -> Result<()> {
    let document = match template {
        Some(path) => {
            EditableDocument::from_text(&std::fs::read_to_string(path).into_diagnostic()?)
        }
        None => EditableDocument::new(),
    };
    let mut session = EditorSession::with_document(document, config.editor.clone());
    if let Some(cursor) = cursor {
        session.place_cursor(cursor);
    }

    let engine = TemplateInsertionEngine::for_session(&session);
    for path in attributes {
        let outcome = match catalog {
            Some(catalog) => {
                let target = catalog.resolve(path).map_err(StencilError::from)?;
                engine.insert_target(&mut session, &target)
            }
            None => match path.split_once('.') {
                Some((parent, name)) => engine.insert(&mut session, name, true, Some(parent)),
                None => engine.insert(&mut session, path, false, None),
            },
        };
        if matches!(outcome, InsertOutcome::Relocated { .. }) {
            tracing::info!(attribute = %path, "already present in loop block");
        }
    }

    let text = session.export_text();
    if let Some(cursor) = session.cursor_offset() {
        let (line, col) = EditorRope::from_str(&text).line_col(cursor);
        tracing::info!(cursor, line = line + 1, column = col + 1, "cursor position");
    }

    match output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(&config.export.file_name)
            } else {
                path.to_path_buf()
            };
            std::fs::write(&path, &text).into_diagnostic()?;
            println!("Template written to: {}", path.display());
        }
        None => println!("{text}"),
    }

    Ok(())
}

fn init_miette() {
    // A hook can only be installed once; the default handler is fine then.
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }));
    miette::set_panic_hook();
}
