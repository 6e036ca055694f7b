use std::path::Path;

use console::Style;
use copynum_core::analysis::config::PipelineConfig;
use copynum_core::report::CellRow;
use copynum_core::stats::CopyNumberStats;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();
    let analysis = &config.analysis;

    println!();
    println!("  {}", s.title.apply_to("Copy Number Analysis"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(20)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Protein"),
        s.value.apply_to(&config.experiment.protein_name)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Condition"),
        s.value.apply_to(&config.experiment.condition)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("GFP stacks"),
        s.path.apply_to(config.paths.gfp_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("RFP stacks"),
        s.path.apply_to(config.paths.rfp_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Masks"),
        s.path.apply_to(config.paths.mask_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(analysis.output.path().display())
    );
    println!();

    println!("  {}", s.header.apply_to("Active Slices"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Drop"),
        s.value.apply_to(format!("{:.1}%", analysis.active_slices.drop_threshold))
    );
    if analysis.active_slices.plot_intensity_profile {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Profiles"),
            s.value.apply_to("enabled")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Profiles"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Correction"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("ra"),
        s.value.apply_to(analysis.correction.ra)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("rg"),
        s.value.apply_to(analysis.correction.rg)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Single mNG"),
        s.value.apply_to(analysis.correction.single_mng_intensity)
    );
    println!();
}

pub fn print_results(rows: &[CellRow], path: &Path) {
    let s = Styles::new();
    let files = rows
        .iter()
        .map(|r| r.file.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Cells"),
        s.value.apply_to(format!("{} in {} file(s)", rows.len(), files))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Table"),
        s.path.apply_to(path.display())
    );
    println!();
}

pub fn print_stats(stats: &CopyNumberStats) {
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Copy Number"));
    let entries = [
        ("Mean", stats.mean),
        ("Median", stats.median),
        ("Std dev", stats.std_dev),
        ("Skewness", stats.skewness),
        ("Kurtosis", stats.kurtosis),
    ];
    println!(
        "    {:<12}{}",
        s.label.apply_to("Cells"),
        s.value.apply_to(stats.count)
    );
    for (label, value) in entries {
        println!(
            "    {:<12}{}",
            s.label.apply_to(label),
            s.value.apply_to(format!("{value:.3}"))
        );
    }
    println!();
}
