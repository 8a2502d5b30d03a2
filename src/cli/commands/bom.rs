//! `wirekit bom` command - bill of materials of a harness document

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{effective_format, escape_tsv, format_quantity, load_harness, write_output};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::bom::{Bom, BomLine};
use crate::core::config::Config;
use crate::core::identity::ItemKind;

#[derive(clap::Args, Debug)]
pub struct BomArgs {
    /// Harness document (YAML)
    pub file: PathBuf,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Only include one kind of item (connector, cable, additional)
    #[arg(long, short = 'k')]
    pub kind: Option<String>,
}

const HEADERS: [&str; 11] = [
    "#",
    "Qty",
    "Unit",
    "Description",
    "Designators",
    "Category",
    "P/N",
    "Manufacturer",
    "MPN",
    "Supplier",
    "SPN",
];

pub fn run(args: BomArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let harness = load_harness(&args.file, &config)?;

    let bom = match args.kind.as_deref() {
        Some(kind) => {
            let kind: ItemKind = kind.parse()?;
            let components: Vec<_> = harness
                .components()
                .into_iter()
                .filter(|c| c.tag() == kind)
                .collect();
            Bom::from_components(&components)?
        }
        None => harness.bom()?,
    };

    let lines = bom.lines();
    let content = render(&lines, effective_format(global, &config))?;
    write_output(&content, args.output.as_ref(), global.quiet)
}

fn row(line: &BomLine) -> [String; 11] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        line.id.to_string(),
        format_quantity(line.quantity),
        text(&line.unit),
        line.description.clone(),
        line.designators.join(", "),
        line.category.clone(),
        text(&line.pn),
        text(&line.manufacturer),
        text(&line.mpn),
        text(&line.supplier),
        text(&line.spn),
    ]
}

/// Render BOM lines in the requested format
pub fn render(lines: &[BomLine], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(lines).into_diagnostic()?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml => serde_yml::to_string(lines).into_diagnostic(),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(HEADERS).into_diagnostic()?;
            for line in lines {
                writer.write_record(row(line)).into_diagnostic()?;
            }
            let bytes = writer.into_inner().into_diagnostic()?;
            String::from_utf8(bytes).into_diagnostic()
        }
        OutputFormat::Tsv => {
            let mut out = HEADERS.join("\t");
            out.push('\n');
            for line in lines {
                let cells: Vec<String> = row(line).iter().map(|c| escape_tsv(c)).collect();
                out.push_str(&cells.join("\t"));
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Md | OutputFormat::Table | OutputFormat::Auto => {
            let mut builder = Builder::default();
            builder.push_record(HEADERS);
            for line in lines {
                builder.push_record(row(line));
            }
            let mut table = builder.build();
            if format == OutputFormat::Md {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            Ok(format!("{}\n", table))
        }
    }
}
