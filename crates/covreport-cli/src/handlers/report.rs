//! Report command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::ReportArgs;
use console::style;
use covreport::{
    CounterEntity, NumberLocale, RenderConfig, ReportCreator, ReportOutcome, ReportRequest,
    SentinelFile, WaitOptions,
};
use std::sync::Arc;

/// Execute the report command
///
/// A failed run is reported on stderr by the library and only turns into an
/// error when `--fail-on-error` is given.
pub fn execute_report(config: &CliConfig, args: &ReportArgs) -> CliResult<()> {
    let render = build_render_config(args)?;
    let request = build_request(args);

    let mut creator = ReportCreator::new(request, render)
        .with_console_messages(!config.verbosity.is_quiet());
    if let Some(tag) = &args.locale {
        creator = creator.with_locale(NumberLocale::from_tag(tag));
    }

    let outcome = creator.run();
    if config.verbosity.is_verbose() {
        print_summary(&outcome, config.color.should_color());
    }

    match outcome.error {
        Some(err) if args.fail_on_error => Err(CliError::report_failed(err.to_string())),
        _ => Ok(()),
    }
}

/// Render options from `--config` overlaid with command-line flags
pub fn build_render_config(args: &ReportArgs) -> CliResult<RenderConfig> {
    let mut render = match &args.config {
        Some(path) => RenderConfig::from_yaml_file(path)?,
        None => RenderConfig::default(),
    };
    if let Some(label) = &args.output_encoding {
        render = render.with_output_encoding(label);
    }
    if let Some(label) = &args.source_encoding {
        render = render.with_source_encoding(label);
    }
    if let Some(title) = &args.title {
        render = render.with_title(title);
    }
    if let Some(footer) = &args.footer {
        render = render.with_footer(footer);
    }
    if let Some(width) = args.tab_width {
        if width == 0 {
            return Err(CliError::invalid_argument("--tab-width must be at least 1"));
        }
        render = render.with_tab_width(width);
    }
    render.validate()?;
    Ok(render)
}

/// Report request from command-line flags
#[must_use]
pub fn build_request(args: &ReportArgs) -> ReportRequest {
    let mut request = ReportRequest::new(&args.artifact_id, &args.exec_file, &args.dest)
        .with_class_dirs(&args.class_dirs)
        .with_source_dirs(&args.source_dirs)
        .with_artifact_wait(
            WaitOptions::artifact()
                .with_timeout(args.wait_timeout)
                .with_poll_interval(args.poll_interval),
        )
        .with_quiescence_wait(
            WaitOptions::quiescence()
                .with_timeout(args.flush_timeout)
                .with_poll_interval(args.poll_interval),
        );
    if let Some(sentinel) = &args.flush_sentinel {
        request = request.with_flush_signal(Arc::new(SentinelFile::new(sentinel)));
    }
    request
}

/// Run state plus one line per counter
#[must_use]
pub fn render_summary(outcome: &ReportOutcome, locale: &NumberLocale) -> String {
    let mut out = format!(
        "{} in {} ms\n",
        outcome.state,
        outcome.elapsed.as_millis()
    );
    if let Some(totals) = &outcome.totals {
        for entity in CounterEntity::ALL {
            let counter = totals.get(entity);
            out.push_str(&format!(
                "{:<12} {} of {} covered ({})\n",
                entity.as_str(),
                locale.format_integer(counter.covered),
                locale.format_integer(counter.total()),
                locale.format_percent(counter.covered_ratio()),
            ));
        }
    }
    if outcome.quiescence_warning {
        out.push_str("warning: flush signal timed out, data may be incomplete\n");
    }
    out
}

fn print_summary(outcome: &ReportOutcome, use_color: bool) {
    let text = render_summary(outcome, &NumberLocale::english());
    for (i, line) in text.lines().enumerate() {
        if use_color && i == 0 {
            let styled = if outcome.is_success() {
                style(line).green().bold()
            } else {
                style(line).red().bold()
            };
            eprintln!("{styled}");
        } else if use_color && line.starts_with("warning") {
            eprintln!("{}", style(line).yellow());
        } else {
            eprintln!("{line}");
        }
    }
}
