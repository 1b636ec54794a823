//! Adapter for the headless-browser control component (§1 Out-of-scope):
//! this gateway never drives a rendering engine itself, it calls out to
//! an external service over HTTP and adapts the reply into the
//! `Browser` port's stream contract, the same "thin client in front of
//! an out-of-process collaborator" shape as `riptide-headless`'s pool
//! sits behind `riptide-headless-api`'s own HTTP boundary.

use futures::stream::{self, BoxStream};
use reader_types::{Browser, PageSnapshot, RequestContext};
use tracing::warn;

/// Calls `{base_url}/scrape?url=...` on an external headless-rendering
/// service and yields its single reply as a one-item stream. The real
/// collaborator may progressively refine a page across several
/// snapshots (§4.5); this adapter only speaks to a service that replies
/// once it's done, which is why every emission here is final.
pub struct RemoteBrowser {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteBrowser {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }
}

impl Browser for RemoteBrowser {
    fn scrape(&self, url: &str, ctx: &RequestContext) -> BoxStream<'static, PageSnapshot> {
        let http = self.http.clone();
        let endpoint = format!("{}/scrape", self.base_url.trim_end_matches('/'));
        let url = url.to_string();
        let user_agent = ctx.user_agent.clone();

        Box::pin(stream::once(async move {
            match fetch(&http, &endpoint, &url, &user_agent).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(url, error = %err, "headless service call failed");
                    PageSnapshot::empty(url)
                }
            }
        }))
    }
}

async fn fetch(http: &reqwest::Client, endpoint: &str, url: &str, user_agent: &str) -> anyhow::Result<PageSnapshot> {
    let response = http
        .get(endpoint)
        .query(&[("url", url)])
        .header("User-Agent", user_agent)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json::<PageSnapshot>().await?)
}
