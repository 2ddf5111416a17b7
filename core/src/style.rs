use std::collections::HashMap;

use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;

use crate::suite::{Points, SuiteReport};
use crate::testing::{TestResult, TestSpec, TestStatus};

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for TestStatus {
    fn color(&self) -> Color {
        use TestStatus::*;
        if !self::is_truecolor_supported() {
            return match self {
                Pass => Color::Green,
                Fail => Color::Yellow,
                Error => Color::Red,
            };
        }

        match self {
            Pass => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            Fail => Color::TrueColor {
                r: 210,
                g: 138,
                b: 4,
            },
            Error => Color::TrueColor {
                r: 220,
                g: 42,
                b: 42,
            },
        }
    }
}

pub fn status_icon(status: TestStatus) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", status.to_string().to_uppercase())
        .on_color(status.color())
        .bold()
        .color(fg)
}

pub fn print_test_start(name: &str) {
    println!("📝 {}", name.bold());
}

pub fn print_test_verdict(res: &TestResult) {
    let emoji = if res.is_pass() { "✅" } else { "❌" };
    println!(
        "{} {} {} [{}]",
        emoji,
        res.name.color(res.status.color()),
        status_icon(res.status),
        res.execution_time,
    );
}

pub fn print_test_result_detail(res: &TestResult, spec: &TestSpec) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let cols = cols.max(20) as usize;

    const BOLD_LINE: &str = "━";
    const THIN_LINE: &str = "─";

    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    println!(
        "\n{}: {}\n{}",
        res.name.color(Color::BrightYellow).bold(),
        status_icon(res.status),
        bold_bar,
    );

    fn print_sub_title(s: &str, cols: usize) {
        println!(
            "{}{}",
            s.cyan().bold(),
            THIN_LINE.repeat(cols.saturating_sub(s.len() + 1)).bright_black(),
        )
    }

    fn print_block(s: &str) {
        if s.is_empty() {
            println!("{}", "<EMPTY>".magenta().dimmed());
        } else {
            println!("{}", s);
        }
    }

    print_sub_title("[command]", cols);
    print_block(&res.test_code);

    print_sub_title(&format!("[expected ({})]", spec.comparison), cols);
    print_block(spec.expected_output());

    if let Some(msg) = &res.err_message {
        print_sub_title("[message]", cols);
        println!("{}", msg.bright_red());
    }

    if let Some(content) = &res.content {
        print_sub_title("[feedback]", cols);
        print_block(content);
    }

    println!("{}", bold_bar);
}

pub fn print_suite_summary(report: &SuiteReport, points: Option<Points>) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    let count: HashMap<TestStatus, usize> =
        report.tests.iter().fold(HashMap::new(), |mut count, r| {
            *count.entry(r.status).or_default() += 1;
            count
        });

    let num_total_test = report.tests.len();
    let num_passed = *count.get(&TestStatus::Pass).unwrap_or(&0);
    let num_failed = num_total_test - num_passed;

    if num_passed == num_total_test {
        let msg = format!("All {} tests passed ✨🌟💖💎🦄💎💖🌟✨", num_total_test);
        print!("{}", msg.green());
    } else {
        let summary_msg = if num_passed > 0 {
            format!("{}/{} tests failed 💣", num_failed, num_total_test)
        } else {
            format!("All {} tests failed 💀", num_total_test)
        };

        let mut detail: Vec<_> = count
            .iter()
            .filter(|(&status, _)| status != TestStatus::Pass)
            .collect();
        detail.sort_by_key(|(&status, _)| status.to_string());
        let detail_msg = detail
            .into_iter()
            .map(|(&status, &cnt)| {
                format!(
                    "{}{}{}",
                    self::status_icon(status),
                    "x".dimmed(),
                    cnt.to_string().bold().bright_white(),
                )
            })
            .collect::<Vec<String>>()
            .join(", ");

        print!("{} ({})", summary_msg.bright_red(), detail_msg);
    }

    println!(" {}", bar);

    if let Some(points) = points {
        println!("🏆 Points {}", points.to_string().bold());
    }
}
