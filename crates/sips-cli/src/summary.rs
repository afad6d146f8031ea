use std::path::Path;

use console::Style;
use sips_core::pipeline::{ExportFormat, ProcessingConfig, SessionConfig};

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

pub fn print_session_summary(session: &SessionConfig) {
    let s = Styles::new();
    print_title(&s, "SIPS Session");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Source"),
        s.path.apply_to(session.source.path.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value
            .apply_to(format!("{}..={}", session.source.start, session.source.end))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(session.export.output.display())
    );
    println!();

    println!("  {}", s.header.apply_to("Correction"));
    match session.references {
        Some(ref refs) => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Flat"),
                s.path.apply_to(refs.flat.display())
            );
            match refs.dark {
                Some(ref dark) => println!(
                    "    {:<12}{}",
                    s.label.apply_to("Dark"),
                    s.path.apply_to(dark.display())
                ),
                None => println!(
                    "    {:<12}{}",
                    s.label.apply_to("Dark"),
                    s.disabled.apply_to("none")
                ),
            }
            println!(
                "    {:<12}{}",
                s.label.apply_to("Range"),
                s.value.apply_to(format!("{}..={}", refs.start, refs.end))
            );
        }
        None => println!("    {}", s.disabled.apply_to("disabled")),
    }
    println!();

    println!("  {}", s.header.apply_to("Geometry"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Rotation"),
        s.value.apply_to(format!("{}\u{00b0}", session.geometry.angle_degrees))
    );
    match session.geometry.crop {
        Some(ref crop) => println!(
            "    {:<12}{}",
            s.label.apply_to("Crop"),
            s.value.apply_to(format!(
                "x {}..{}, y {}..{}",
                crop.x_left, crop.x_right, crop.y_top, crop.y_bottom
            ))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Crop"),
            s.disabled.apply_to("full frame")
        ),
    }
    println!();

    print_processing(&s, &session.processing);
    println!(
        "  {:<14}{}",
        s.label.apply_to("Export"),
        s.method.apply_to(session.export.format)
    );
    println!();
}

pub fn print_export_summary(
    source: &Path,
    output: &Path,
    format: ExportFormat,
    range: (usize, usize),
    config: &ProcessingConfig,
) {
    let s = Styles::new();
    print_title(&s, "SIPS Export");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Source"),
        s.path.apply_to(source.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Format"),
        s.method.apply_to(format)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Range"),
        s.value.apply_to(format!("{}..={}", range.0, range.1))
    );
    println!();

    print_processing(&s, config);
}

fn print_processing(s: &Styles, config: &ProcessingConfig) {
    println!("  {}", s.header.apply_to("Processing"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Mode"),
        s.method.apply_to(config.mode)
    );
    if config.mode.uses_neighbours() {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Order"),
            s.value.apply_to(config.order())
        );
    }

    let stage = |name: &str, enabled: bool, detail: String| {
        if enabled {
            println!(
                "    {:<12}{}",
                s.label.apply_to(name),
                s.value.apply_to(detail)
            );
        } else {
            println!(
                "    {:<12}{}",
                s.label.apply_to(name),
                s.disabled.apply_to("off")
            );
        }
    };
    stage(
        "Clip",
        config.clip.enabled,
        format!(
            "{}% / {}%",
            config.clip.min_percentile, config.clip.max_percentile
        ),
    );
    stage(
        "Gaussian",
        config.gaussian.enabled,
        format!("sigma={}", config.gaussian.sigma),
    );
    stage(
        "Denoise",
        config.denoise.enabled,
        format!(
            "{}% (template {}, search {})",
            config.denoise.strength_percent,
            config.denoise.template_window,
            config.denoise.search_window
        ),
    );
    stage(
        "CLAHE",
        config.clahe.enabled,
        format!(
            "clip={}, grid={}x{}",
            config.clahe.clip_limit, config.clahe.tile_grid, config.clahe.tile_grid
        ),
    );

    if config.view.resize_factor != 1.0 || config.view.zoom_factor != 1.0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("View"),
            s.value.apply_to(format!(
                "resize x{}, zoom x{}",
                config.view.resize_factor, config.view.zoom_factor
            ))
        );
    }
    println!();
}
