use chromadrift_core::pipeline::config::{ChromaticConfig, DriftConfig, InputMode};
use chromadrift_core::pipeline::RunReport;
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
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
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
}

pub fn print_chromatic_summary(config: &ChromaticConfig) {
    let s = Styles::new();
    print_title(&s, "Chromatic Correction");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Transforms"),
        s.path.apply_to(config.transform_file.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Microscope"),
        s.value.apply_to(&config.microscope)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_folder.display())
    );
    println!();

    println!("  {}", s.header.apply_to("Input"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Mode"),
        s.method.apply_to(&config.mode)
    );
    match &config.mode {
        InputMode::Multichannel { input_folder, .. } => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Folder"),
                s.path.apply_to(input_folder.display())
            );
        }
        InputMode::SplitChannels { channel_map, .. }
        | InputMode::GroupedChannels { channel_map, .. } => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Channel map"),
                s.path.apply_to(channel_map.display())
            );
        }
    }
    println!();
}

pub fn print_drift_summary(config: &DriftConfig) {
    let s = Styles::new();
    print_title(&s, "Drift Correction");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input_folder.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_folder.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Pixel type"),
        s.value.apply_to(config.output_dtype)
    );
    println!();

    let reg = &config.registration;
    println!("  {}", s.header.apply_to("Registration"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Transform"),
        s.method.apply_to(reg.transform)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Metric"),
        s.method.apply_to(format!("Mattes MI ({} bins)", reg.histogram_bins))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Step"),
        s.value.apply_to(format!("{} .. {}", reg.learning_rate, reg.min_step))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Iterations"),
        s.value.apply_to(reg.max_iterations)
    );
    println!();
}

pub fn print_run_report(report: &RunReport) {
    let s = Styles::new();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Written"),
        s.value.apply_to(report.outputs.len())
    );
    if report.skipped.is_empty() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Skipped"),
            s.disabled.apply_to("none")
        );
    } else {
        println!("  {}", s.header.apply_to("Skipped"));
        for skipped in &report.skipped {
            println!(
                "    {} {}",
                s.path.apply_to(skipped.path.display()),
                s.disabled.apply_to(format!("({})", skipped.reason))
            );
        }
    }
    println!();
}
