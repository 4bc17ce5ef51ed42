use crate::error::{Result, ScanError};
use crate::extract::{Link, ScriptAttr, extract_links};
use crate::sitemap::Sitemap;
use crate::url_util::domain_of;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore, mpsc, oneshot};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub type ProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

pub struct Crawler {
    client: Client,
    timeout_secs: u64,
    user_agent: String,
    concurrency: usize,
    max_depth: usize,
    max_duration: Option<Duration>,
    script_attr: ScriptAttr,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let user_agent = format!("sitemapper/{}", env!("CARGO_PKG_VERSION"));

        Self {
            client: build_client(timeout_secs, &user_agent),
            timeout_secs,
            user_agent,
            concurrency: 10,
            max_depth: 3,
            max_duration: None,
            script_attr: ScriptAttr::default(),
            progress_callback: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self.client = build_client(self.timeout_secs, &self.user_agent);
        self
    }

    /// Upper bound on fetches in flight at once. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Stored for callers; the crawl itself follows the link graph to
    /// exhaustion regardless of depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Stop after `duration` and return whatever has been mapped so far.
    pub fn with_max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }

    pub fn with_script_attr(mut self, script_attr: ScriptAttr) -> Self {
        self.script_attr = script_attr;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Crawl from `seed_url` and return the sitemap once no visit is
    /// outstanding (or `max_duration` elapses).
    ///
    /// Pages are only followed on the seed's host; assets are kept from any
    /// host. The only error is a seed whose host can't be parsed. Failed
    /// fetches are dead ends.
    pub async fn crawl(&self, seed_url: &str) -> Result<Sitemap> {
        let parent_domain = domain_of(seed_url)?;
        info!(
            "Starting crawl of {} with {} concurrent fetches",
            seed_url, self.concurrency
        );

        let sitemap = Sitemap::new();
        let mut seen: HashSet<String> = HashSet::new();
        let in_flight = Arc::new(InFlight::default());
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let (link_tx, mut link_rx) = mpsc::unbounded_channel::<Discovered>();
        let mut visits = JoinSet::new();

        // The seed is seen before any link names it. A page linking back to
        // the seed still records that edge but never triggers a second fetch.
        seen.insert(seed_url.to_string());
        self.spawn_visit(
            &mut visits,
            seed_url.to_string(),
            in_flight.begin(),
            &permits,
            &link_tx,
        );

        let (done_tx, mut done_rx) = oneshot::channel::<()>();
        let supervisor = {
            let in_flight = in_flight.clone();
            tokio::spawn(async move {
                in_flight.wait_idle().await;
                let _ = done_tx.send(());
            })
        };

        let deadline = self.max_duration.map(|d| Instant::now() + d);
        let timeout = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(timeout);

        loop {
            tokio::select! {
                Some(found) = link_rx.recv() => {
                    if let Some(next) = self.record(&found.link, &parent_domain, &sitemap, &mut seen) {
                        // `found` still pins its page's visit, so the count
                        // can't touch zero before the child is counted.
                        self.spawn_visit(&mut visits, next, in_flight.begin(), &permits, &link_tx);
                    }
                }
                Some(joined) = visits.join_next() => {
                    if let Err(e) = joined
                        && e.is_panic()
                    {
                        warn!("Visit task panicked: {}", e);
                    }
                }
                _ = &mut done_rx => {
                    info!("Crawl complete. Visited {} URLs", seen.len());
                    break;
                }
                _ = &mut timeout => {
                    info!(
                        "Crawl stopped after {:?} with {} visits outstanding",
                        self.max_duration.unwrap_or_default(),
                        in_flight.outstanding()
                    );
                    break;
                }
            }
        }

        supervisor.abort();
        visits.abort_all();

        Ok(sitemap)
    }

    /// Apply the domain policy to a discovered link, record it, and return
    /// the URL to visit next if it hasn't been seen.
    fn record(
        &self,
        link: &Link,
        parent_domain: &str,
        sitemap: &Sitemap,
        seen: &mut HashSet<String>,
    ) -> Option<String> {
        let link_domain = match domain_of(link.url()) {
            Ok(domain) => domain,
            Err(e) => {
                debug!("Dropping {}: {}", link.url(), e);
                return None;
            }
        };

        // Assets are commonly served from a CDN, so only pages are pinned to
        // the seed's host.
        if !link.is_asset() && link_domain != parent_domain {
            debug!("Dropping cross-domain page {}", link.url());
            return None;
        }

        sitemap.add_link(link);

        if !seen.insert(link.url().to_string()) {
            return None;
        }

        Some(link.url().to_string())
    }

    fn spawn_visit(
        &self,
        visits: &mut JoinSet<()>,
        url: String,
        guard: VisitGuard,
        permits: &Arc<Semaphore>,
        link_tx: &mpsc::UnboundedSender<Discovered>,
    ) {
        let client = self.client.clone();
        let permits = permits.clone();
        let link_tx = link_tx.clone();
        let script_attr = self.script_attr;
        let progress_cb = self.progress_callback.clone();

        visits.spawn(async move {
            let guard = Arc::new(guard);

            let body = {
                let Ok(_permit) = permits.acquire().await else {
                    return;
                };
                if let Some(ref callback) = progress_cb {
                    callback(url.clone());
                }
                fetch(&client, &url).await
            };

            let body = match body {
                Ok(body) => body,
                Err(e) => {
                    debug!("{}", e);
                    return;
                }
            };

            let links = extract_links(&url, &body, script_attr);
            debug!("Found {} links on {}", links.len(), url);

            for link in links {
                let found = Discovered {
                    link,
                    _visit: guard.clone(),
                };
                if link_tx.send(found).is_err() {
                    break;
                }
            }
        });
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

fn build_client(timeout_secs: u64, user_agent: &str) -> Client {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
        .pool_max_idle_per_host(50)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("Failed to create HTTP client")
}

async fn fetch(client: &Client, url: &str) -> Result<Vec<u8>> {
    debug!("Fetching {}", url);

    let to_error = |source| ScanError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(to_error)?;
    let body = response.bytes().await.map_err(to_error)?;

    Ok(body.to_vec())
}

/// A link on its way to the control loop. Holds its page's visit open until
/// the loop is done with it.
struct Discovered {
    link: Link,
    _visit: Arc<VisitGuard>,
}

/// Count of visits not yet fully processed.
#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    /// Count a visit. Must happen before the visit is spawned.
    fn begin(self: &Arc<Self>) -> VisitGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        VisitGuard(self.clone())
    }

    fn outstanding(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

struct VisitGuard(Arc<InFlight>);

impl Drop for VisitGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}
