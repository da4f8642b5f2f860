//! Canonical streaming-service identity and offer mapping

use crate::results::{OfferType, Quality};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A known streaming service
#[derive(Debug, Clone, Copy)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub logo: &'static str,
}

/// Canonical streaming-service table, keyed by normalized name
static STREAMING_SERVICES: Lazy<HashMap<&'static str, ServiceInfo>> = Lazy::new(|| {
    HashMap::from([
        (
            "netflix",
            ServiceInfo {
                name: "Netflix",
                logo: "/logos/netflix.svg",
            },
        ),
        (
            "amazon_prime",
            ServiceInfo {
                name: "Prime Video",
                logo: "/logos/prime.svg",
            },
        ),
        (
            "prime_video",
            ServiceInfo {
                name: "Prime Video",
                logo: "/logos/prime.svg",
            },
        ),
        (
            "disney_plus",
            ServiceInfo {
                name: "Disney+",
                logo: "/logos/disney.svg",
            },
        ),
        (
            "disney+",
            ServiceInfo {
                name: "Disney+",
                logo: "/logos/disney.svg",
            },
        ),
        (
            "hulu",
            ServiceInfo {
                name: "Hulu",
                logo: "/logos/hulu.svg",
            },
        ),
        (
            "hbo_max",
            ServiceInfo {
                name: "Max",
                logo: "/logos/max.svg",
            },
        ),
        (
            "max",
            ServiceInfo {
                name: "Max",
                logo: "/logos/max.svg",
            },
        ),
        (
            "apple_tv_plus",
            ServiceInfo {
                name: "Apple TV+",
                logo: "/logos/apple.svg",
            },
        ),
        (
            "apple_tv+",
            ServiceInfo {
                name: "Apple TV+",
                logo: "/logos/apple.svg",
            },
        ),
        (
            "paramount_plus",
            ServiceInfo {
                name: "Paramount+",
                logo: "/logos/paramount.svg",
            },
        ),
        (
            "paramount+",
            ServiceInfo {
                name: "Paramount+",
                logo: "/logos/paramount.svg",
            },
        ),
        (
            "peacock",
            ServiceInfo {
                name: "Peacock",
                logo: "/logos/peacock.svg",
            },
        ),
    ])
});

/// Look up a provider's raw source name in the canonical table.
/// Names normalize by lowercasing and mapping whitespace to underscores.
pub fn lookup(raw_name: &str) -> Option<&'static ServiceInfo> {
    let normalized = raw_name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    STREAMING_SERVICES.get(normalized.as_str())
}

/// Map a provider offer type string to the canonical offer.
/// Returns `None` for unrecognized types, which are filtered out of the
/// canonical source list.
pub fn parse_offer(raw_type: &str, price: f32) -> Option<(OfferType, Option<f32>)> {
    match raw_type {
        "sub" | "subscription" => Some((OfferType::Subscription, None)),
        "free" | "ads" | "tve" => Some((OfferType::Free, None)),
        "rent" => Some((OfferType::Rent, non_negative_price(price))),
        "buy" | "purchase" => Some((OfferType::Buy, non_negative_price(price))),
        _ => None,
    }
}

fn non_negative_price(price: f32) -> Option<f32> {
    if price > 0.0 {
        Some(price)
    } else {
        None
    }
}

/// Map a provider format string to a quality tier, defaulting to HD
pub fn parse_quality(raw_format: &str) -> Quality {
    match raw_format.trim().to_uppercase().as_str() {
        "SD" => Quality::Sd,
        "4K" | "UHD" => Quality::FourK,
        _ => Quality::Hd,
    }
}
