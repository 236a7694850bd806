//! `reqwest` client construction for proxied and direct attempts.

use std::time::Duration;

use pricebot_core::{ProxyDescriptor, ProxyKind};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, DNT, REFERER,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{Client, Proxy};

use crate::error::TransportError;

/// Headers a desktop browser sends on a top-level navigation.
///
/// `Accept-Encoding` is set by the client's gzip/brotli/deflate layer, which
/// also decodes the body.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("es-ES,es;q=0.9,en;q=0.8"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

fn base_builder(timeout: Duration) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .default_headers(browser_headers())
        .gzip(true)
        .brotli(true)
        .deflate(true)
}

/// Translates a descriptor into a `reqwest` proxy for every target scheme.
fn to_reqwest_proxy(descriptor: &ProxyDescriptor) -> Result<Proxy, TransportError> {
    let url = match descriptor.kind {
        ProxyKind::Http | ProxyKind::Https => descriptor.proxy_url(),
        // Resolve target hostnames on the relay, not locally.
        ProxyKind::Socks5 => format!("socks5h://{}", descriptor.address),
    };
    Proxy::all(&url).map_err(|source| TransportError::InvalidProxy {
        proxy: descriptor.to_string(),
        source,
    })
}

/// Client that routes every request through `descriptor`.
pub(super) fn proxied_client(
    descriptor: &ProxyDescriptor,
    timeout: Duration,
) -> Result<Client, TransportError> {
    let proxy = to_reqwest_proxy(descriptor)?;
    base_builder(timeout)
        .proxy(proxy)
        .build()
        .map_err(|source| TransportError::InvalidProxy {
            proxy: descriptor.to_string(),
            source,
        })
}

/// Client for the no-proxy fallback. System proxy variables are ignored so
/// "direct" really means direct.
pub(super) fn direct_client(timeout: Duration) -> Result<Client, TransportError> {
    base_builder(timeout)
        .no_proxy()
        .build()
        .map_err(TransportError::Http)
}
