use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use sitemapper_core::crawl::{CrawlOptions, execute_crawl};
use sitemapper_core::report::{CrawlSummary, ReportFormat, render, save_report};
use sitemapper_core::seed::normalize_seed;
use sitemapper_scanner::{ScriptAttr, Sitemap};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Everything `crawl` needs, pulled out of the parsed arguments.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub options: CrawlOptions,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

pub fn crawl_request_from_matches(args: &ArgMatches) -> Result<CrawlRequest> {
    let raw_url = args
        .get_one::<String>("URL")
        .ok_or_else(|| anyhow!("Please give a URL to crawl."))?;
    let url = normalize_seed(raw_url).map_err(|e| anyhow!(e))?;

    let threads = args.get_one::<usize>("threads").copied().unwrap_or(10);
    let timeout_secs = args.get_one::<u64>("timeout").copied().unwrap_or(10);
    let max_duration = args
        .get_one::<u64>("max-duration")
        .map(|secs| Duration::from_secs(*secs));
    let max_depth = args.get_one::<usize>("depth").copied().unwrap_or(3);
    let script_attr = if args.get_flag("legacy-script-href") {
        ScriptAttr::Href
    } else {
        ScriptAttr::Src
    };

    let format = args
        .get_one::<String>("format")
        .map(|f| ReportFormat::from_str(f))
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or(ReportFormat::Text);
    let output = args.get_one::<PathBuf>("output").cloned();
    let quiet = args.get_flag("quiet");

    Ok(CrawlRequest {
        options: CrawlOptions {
            url,
            threads,
            timeout_secs,
            max_duration,
            max_depth,
            script_attr,
            show_progress: !quiet,
        },
        format,
        output,
        quiet,
    })
}

pub async fn handle_crawl(args: &ArgMatches) -> Result<()> {
    let request = crawl_request_from_matches(args)?;

    if !request.quiet {
        print_divider();
        println!(
            "{} {}",
            "  CRAWLING".bright_white().bold(),
            request.options.url.bright_cyan()
        );
        print_divider();
        println!("{} Workers: {}", "→".blue(), request.options.threads);
        if let Some(duration) = request.options.max_duration {
            println!("{} Time limit: {}s", "→".blue(), duration.as_secs());
        }
        println!();
    }

    let sitemap = execute_crawl(request.options.clone())
        .await
        .with_context(|| format!("Crawl of {} failed", request.options.url))?;

    write_report(&sitemap, &request)?;

    if !request.quiet {
        print_summary(&CrawlSummary::from_sitemap(&sitemap));
    }

    Ok(())
}

/// Render the sitemap and either print it or save it to the requested file.
pub fn write_report(sitemap: &Sitemap, request: &CrawlRequest) -> Result<()> {
    let report = render(sitemap, request.format).context("Failed to render report")?;

    match request.output {
        Some(ref path) => {
            save_report(&report, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !request.quiet {
                println!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", report),
    }

    Ok(())
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_summary(summary: &CrawlSummary) {
    println!();
    println!("{}", "Summary:".bright_white().bold());
    println!("  Pages with links: {}", summary.parents);
    println!("  Page links: {}", summary.pages);
    println!("  Asset links: {}", summary.assets);
}
