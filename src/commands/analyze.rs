//! Review analysis command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::pipeline::{PipelineOptions, ProductTarget, ReviewPipeline, ReviewReport};
use crate::session::{HttpSessionFactory, SessionFactory};
use crate::site::Site;
use anyhow::{Context, Result};
use tracing::info;

/// Analyzes the reviews of one or more product pages.
pub struct AnalyzeCommand {
    config: Config,
    site: Option<Site>,
}

impl AnalyzeCommand {
    /// Creates a new analyze command.
    pub fn new(config: Config) -> Self {
        Self { config, site: None }
    }

    /// Forces the site instead of detecting it from each URL's host.
    pub fn with_site(mut self, site: Option<Site>) -> Self {
        self.site = site;
        self
    }

    /// Analyzes one product and returns formatted output.
    pub async fn execute(&self, url: &str) -> Result<String> {
        self.execute_with_factory(HttpSessionFactory::new(&self.config), url).await
    }

    /// Analyzes one product with a provided session factory (for testing).
    pub async fn execute_with_factory<F: SessionFactory>(
        &self,
        factory: F,
        url: &str,
    ) -> Result<String> {
        let target = self.target(url)?;
        let pipeline = ReviewPipeline::new(factory, PipelineOptions::from_config(&self.config));

        let report = pipeline.run(&target).await.context("Failed to analyze product")?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_report(&report))
    }

    /// Analyzes several products, one session each, and returns a summary.
    pub async fn execute_batch(&self, urls: &[String]) -> Result<String> {
        self.execute_batch_with_factory(HttpSessionFactory::new(&self.config), urls).await
    }

    /// Analyzes several products with a provided session factory (for testing).
    pub async fn execute_batch_with_factory<F: SessionFactory>(
        &self,
        factory: F,
        urls: &[String],
    ) -> Result<String> {
        let pipeline = ReviewPipeline::new(factory, PipelineOptions::from_config(&self.config));
        let mut reports: Vec<ReviewReport> = Vec::new();

        for url in urls {
            let target = match self.target(url) {
                Ok(target) => target,
                Err(e) => {
                    eprintln!("Skipping {}: {}", url, e);
                    continue;
                }
            };

            match pipeline.run(&target).await {
                Ok(report) => reports.push(report),
                Err(e) => eprintln!("Failed to analyze {}: {}", url, e),
            }
        }

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_reports(&reports))
    }

    fn target(&self, url: &str) -> Result<ProductTarget> {
        let target = match self.site {
            Some(site) => ProductTarget::with_site(url.trim(), site),
            None => ProductTarget::parse(url)?,
        };
        info!("Target: {} ({})", target.url, target.site);
        Ok(target)
    }
}
