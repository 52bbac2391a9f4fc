use std::{collections::HashSet, time::Duration};

use rand::Rng;

use crate::{
    configuration::{OutputSettings, ScrapeSettings, Settings},
    domain::investor::{assemble, ExtractionBatch, RunResult, RunStatus, StopReason},
    error::{PageError, ScrapeError},
};

use super::{extract_batch, Clock, Droid, FieldSelectors, PageSession, RecordSink, SystemClock};

#[derive(Debug, PartialEq)]
enum LoopState {
    Scrolling,
    Settling,
    Extracting,
    Deciding,
    Stopped(StopReason),
}

/// Launches a browser and scrapes the investors table once. Only a failure to
/// acquire the browser, open the page or create the output files is returned
/// as an error; anything later ends the run early with what was collected.
pub async fn run_extraction(settings: &Settings) -> Result<RunResult, ScrapeError> {
    let droid = Droid::launch(&settings.browser).await?;

    InvestorScraper::new(&settings.scrape, &settings.output, &SystemClock)
        .run(droid)
        .await
}

pub struct InvestorScraper<'a> {
    scrape: &'a ScrapeSettings,
    output: &'a OutputSettings,
    selectors: FieldSelectors,
    clock: &'a dyn Clock,
}

impl<'a> InvestorScraper<'a> {
    pub fn new(
        scrape: &'a ScrapeSettings,
        output: &'a OutputSettings,
        clock: &'a dyn Clock,
    ) -> Self {
        InvestorScraper {
            scrape,
            output,
            selectors: FieldSelectors::default(),
            clock,
        }
    }

    /// Takes ownership of the page and closes it on every exit path.
    pub async fn run<P: PageSession>(&self, page: P) -> Result<RunResult, ScrapeError> {
        let result = self.scrape_page(&page).await;

        if let Err(e) = page.close().await {
            log::error!("Failed to close browser session: {}", e);
        }

        result
    }

    async fn scrape_page<P: PageSession>(&self, page: &P) -> Result<RunResult, ScrapeError> {
        let target_url = self.scrape.target_url().map_err(|e| {
            ScrapeError::Launch(format!("Invalid target url {}: {}", self.scrape.target_url, e))
        })?;
        if self.scrape.scroll_step <= 0 {
            return Err(ScrapeError::Launch(format!(
                "Scroll step must be positive, got {}",
                self.scrape.scroll_step
            )));
        }

        page.goto(target_url.as_str())
            .await
            .map_err(|e| ScrapeError::Launch(format!("Failed to open {}: {}", target_url, e)))?;
        log::info!("Website loaded successfully: {}", target_url);
        tokio::time::sleep(self.scrape.initial_settle()).await;

        let mut sink = RecordSink::initialize(self.output, self.clock)?;
        let stop_reason = self.drive(page, &mut sink).await;

        log::info!(
            "Stopped ({:?}). Saved {} investors to {} and {}",
            stop_reason,
            sink.written(),
            sink.csv_path().display(),
            sink.txt_path().display()
        );

        Ok(RunResult {
            structured_file_path: sink.csv_path().to_path_buf(),
            human_readable_file_path: sink.txt_path().to_path_buf(),
            record_count: sink.written(),
            status: RunStatus::Success,
            stop_reason,
        })
    }

    async fn drive<P: PageSession>(&self, page: &P, sink: &mut RecordSink) -> StopReason {
        let mut state = LoopState::Scrolling;
        let mut scrolled: i64 = 0;
        let mut timeouts: u32 = 0;
        let mut seen: HashSet<String> = HashSet::new();

        loop {
            state = match state {
                LoopState::Scrolling => match page.scroll_by(self.scrape.scroll_step).await {
                    Ok(()) => {
                        scrolled += self.scrape.scroll_step;
                        LoopState::Settling
                    }
                    Err(e) => self.recover(e, &mut timeouts, LoopState::Scrolling).await,
                },
                LoopState::Settling => {
                    tokio::time::sleep(self.scrape.settle()).await;
                    LoopState::Extracting
                }
                LoopState::Extracting => match extract_batch(page, &self.selectors).await {
                    Ok(batch) => {
                        timeouts = 0;
                        match self.accept(batch, &mut seen, sink) {
                            Ok(()) => LoopState::Deciding,
                            Err(e) => {
                                log::error!("Failed to persist investor: {}", e);
                                LoopState::Stopped(StopReason::Aborted)
                            }
                        }
                    }
                    // The viewport already moved; sample it again instead of scrolling past it.
                    Err(e) => self.recover(e, &mut timeouts, LoopState::Settling).await,
                },
                LoopState::Deciding => match scrolled > self.scrape.max_scroll_distance {
                    true => {
                        log::info!("Scrolled {} px, assuming end of data", scrolled);
                        LoopState::Stopped(StopReason::DistanceReached)
                    }
                    false => LoopState::Scrolling,
                },
                LoopState::Stopped(reason) => return reason,
            };
        }
    }

    /// Timeouts are retried with backoff up to the configured number of
    /// consecutive attempts, resuming at `retry`. Any other page error stops
    /// the run.
    async fn recover(&self, e: PageError, timeouts: &mut u32, retry: LoopState) -> LoopState {
        if !e.is_timeout() {
            log::error!("Unexpected error: {}", e);
            return LoopState::Stopped(StopReason::Aborted);
        }

        *timeouts += 1;
        if *timeouts > self.scrape.max_timeout_retries {
            log::error!("Giving up after {} consecutive timeouts: {}", *timeouts, e);
            return LoopState::Stopped(StopReason::RetriesExhausted);
        }

        let delay = self.backoff_with_jitter(*timeouts);
        log::warn!(
            "Timeout occurred ({}). Trying again in {:?} (attempt {}/{})",
            e,
            delay,
            *timeouts,
            self.scrape.max_timeout_retries
        );
        tokio::time::sleep(delay).await;
        retry
    }

    fn backoff_with_jitter(&self, attempt: u32) -> Duration {
        let delay = self.scrape.backoff(attempt);
        let max_jitter = delay.as_millis() as u64 / 10;
        let jitter = rand::thread_rng().gen_range(0..=max_jitter);
        delay + Duration::from_millis(jitter)
    }

    fn accept(
        &self,
        batch: ExtractionBatch,
        seen: &mut HashSet<String>,
        sink: &mut RecordSink,
    ) -> Result<(), ScrapeError> {
        let sampled = batch.investors.len();
        let records = assemble(batch, seen);

        for record in records.iter() {
            sink.append(record)?;
            log::info!(
                "Investor: {} | Deals: {} | Median Amount: {}",
                record.investor,
                record.deals,
                record.median_amount
            );
        }

        log::debug!(
            "Sampled {} investors, accepted {}, {} seen so far",
            sampled,
            records.len(),
            seen.len()
        );
        Ok(())
    }
}
