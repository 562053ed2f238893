use crate::api::{VerifyOptions, verify_with_fs};
use crate::cli::{OutputFormat, VerifyArgs};
use crate::commands::exit_code;
use crate::fs::{FileSystem, default_fs};
use crate::output::{JsonOutput, MarkdownOutput, render};
use crate::style;
use std::io::{self, Write};

pub fn cmd_verify(args: VerifyArgs) -> i32 {
    cmd_verify_with_fs(args, default_fs())
}

pub fn cmd_verify_with_fs(args: VerifyArgs, fs: &dyn FileSystem) -> i32 {
    let options = VerifyOptions {
        base_package: args.base_package.clone(),
        config_dir: args.config_dir.clone(),
    };

    let result = match verify_with_fs(&args.classes, options, fs) {
        Ok(result) => result,
        Err(e) => {
            style::error(&e.to_string());
            return exit_code::FAILURE;
        }
    };

    let rendered = match args.format {
        OutputFormat::Markdown => render(&MarkdownOutput::default(), &result),
        OutputFormat::Json => render(&JsonOutput::new(), &result),
    };
    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(e) => {
            style::error(&format!("Failed to format output: {}", e));
            return exit_code::FAILURE;
        }
    };

    let write_result = match &args.output {
        Some(output_path) => fs.write(output_path, &rendered),
        None => {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", rendered).and_then(|_| stdout.flush())
        }
    };
    if let Err(e) = write_result {
        style::error(&format!("Failed to write output: {}", e));
        return exit_code::FAILURE;
    }

    if let Some(output_path) = &args.output {
        style::section("Summary");
        println!("{}", style::metric("Modules", result.modules.len()));
        println!("{}", style::metric("Violations", result.violations.len()));
        style::status(&format!("Report written to {}", style::path(output_path)));
    }

    if result.violations.is_empty() {
        exit_code::COMPLIANT
    } else {
        for violation in result.violations.iter().take(3) {
            style::warning(&format!(
                "{} {}",
                style::rule(&violation.rule.to_string()),
                violation.message
            ));
        }
        exit_code::VIOLATIONS
    }
}
