use console::Style;
use refscale_core::board::Board;
use refscale_core::units::format_feet_inches;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    calibrated: Style,
    disabled: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            calibrated: Style::new().green(),
            disabled: Style::new().dim().yellow(),
        }
    }
}

pub fn print_board_summary(board: &Board) {
    let s = Styles::new();
    let (paper_w, paper_h) = board.paper_inches();

    println!();
    println!("  {}", s.title.apply_to("Reference Board"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!(
        "  {:<14}{} {} ({:.2}\" x {:.2}\")",
        s.label.apply_to("Paper"),
        s.value.apply_to(board.paper()),
        board.orientation(),
        paper_w,
        paper_h
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Scale"),
        s.value.apply_to(board.drafting_scale())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Resolution"),
        s.value.apply_to(format!("{} px/in", board.pixels_per_inch()))
    );
    println!();

    if board.is_empty() {
        println!("  {}", s.disabled.apply_to("No images"));
        println!();
        return;
    }

    println!("  {}", s.header.apply_to(format!("Images ({})", board.len())));
    for img in board.images() {
        let pos = img.position();
        let size = img.size();
        println!(
            "    {:<8}{}",
            s.value.apply_to(img.id()),
            img.name().unwrap_or("")
        );
        println!(
            "      {:<12}{}x{} px",
            s.label.apply_to("Native"),
            img.original_width(),
            img.original_height()
        );
        println!(
            "      {:<12}{:.1} x {:.1} px at ({:.1}, {:.1})",
            s.label.apply_to("Display"),
            size.width,
            size.height,
            pos.x,
            pos.y
        );
        match img.calibration() {
            Some(cal) => println!(
                "      {:<12}{}",
                s.label.apply_to("Calibrated"),
                s.calibrated.apply_to(format!(
                    "{:.1} px = {} (x{:.4})",
                    cal.reference_pixel_distance,
                    format_feet_inches(cal.reference_inches),
                    img.scale_factor()
                ))
            ),
            None => println!(
                "      {:<12}{}",
                s.label.apply_to("Calibrated"),
                s.disabled.apply_to("no")
            ),
        }
    }
    println!();
}
