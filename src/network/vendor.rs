//! MAC address vendor resolution.
//!
//! A static table of common OUIs answers first; on a miss, one
//! short-timeout query goes to a public lookup service. Every failure mode
//! (malformed MAC, network failure, empty body) degrades to `"Unknown"` —
//! vendor resolution never errors.

use reqwest::Client;

use crate::config::{VENDOR_LOOKUP_TIMEOUT, vendor_endpoint};
use crate::log_debug;
use crate::scanner::BoxFuture;

/// Fallback vendor name when resolution fails at any stage.
pub const UNKNOWN_VENDOR: &str = "Unknown";

/// Common OUIs resolved without touching the network.
const LOCAL_OUI: &[(&str, &str)] = &[
    ("00:1A:2B", "Cisco"),
    ("00:1B:63", "Apple"),
    ("00:1C:B3", "Dell"),
    ("00:09:6B", "Intel"),
    ("00:0C:29", "VMware"),
    ("00:50:56", "VMware"),
    ("F4:5C:89", "Samsung"),
    ("3C:5A:B4", "Google"),
    ("FC:FB:FB", "Amazon"),
    ("00:15:5D", "Microsoft"),
    ("B8:27:EB", "Raspberry Pi"),
    ("DC:A6:32", "TP-Link"),
    ("D8:CB:8A", "Xiaomi"),
    ("00:1E:C2", "Hewlett Packard"),
    ("00:21:5A", "ASUSTek"),
    ("00:25:9C", "Hon Hai (Foxconn)"),
    ("00:0D:93", "Sony"),
    ("00:13:CE", "Nintendo"),
    ("00:17:88", "LG"),
    ("00:18:82", "Motorola"),
    ("00:1D:D8", "Lenovo"),
    ("00:1D:72", "Acer"),
];

/// Normalizes a MAC to uppercase colon-separated octets.
///
/// Accepts `-` and `.` separators; anything with fewer than three octet
/// groups is rejected.
pub fn normalize_mac(mac: &str) -> Option<String> {
    let normalized = mac.trim().to_uppercase().replace(['-', '.'], ":");
    let parts: Vec<&str> = normalized.split(':').filter(|p| !p.is_empty()).collect();
    if parts.len() < 3 {
        return None;
    }
    Some(parts.join(":"))
}

/// Extracts the OUI (first three octets) from a normalized MAC.
pub fn oui_prefix(normalized_mac: &str) -> Option<String> {
    let parts: Vec<&str> = normalized_mac.split(':').take(3).collect();
    if parts.len() < 3 {
        return None;
    }
    Some(parts.join(":"))
}

/// Resolves a MAC address to a manufacturer name. Infallible by contract.
pub trait VendorResolver: Send + Sync {
    fn resolve<'a>(&'a self, mac: &'a str) -> BoxFuture<'a, String>;
}

/// Static-table-first vendor resolver with a remote API fallback.
pub struct OuiVendorResolver {
    http: Client,
    endpoint: String,
}

impl OuiVendorResolver {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_endpoint(vendor_endpoint())
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(VENDOR_LOOKUP_TIMEOUT)
            .build()
            .map_err(anyhow::Error::from)?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    fn local_lookup(oui: &str) -> Option<&'static str> {
        LOCAL_OUI
            .iter()
            .find(|(prefix, _)| *prefix == oui)
            .map(|(_, vendor)| *vendor)
    }

    async fn remote_lookup(&self, oui: &str) -> Option<String> {
        let url = format!("{}/{}", self.endpoint, oui.replace(':', "-"));
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                log_debug!("Vendor lookup request for {} failed: {}", oui, e);
                return None;
            }
        };
        let body = response.error_for_status().ok()?.text().await.ok()?;
        let vendor = body.trim();
        if vendor.is_empty() {
            None
        } else {
            Some(vendor.to_string())
        }
    }
}

impl VendorResolver for OuiVendorResolver {
    fn resolve<'a>(&'a self, mac: &'a str) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let Some(normalized) = normalize_mac(mac) else {
                return UNKNOWN_VENDOR.to_string();
            };
            let Some(oui) = oui_prefix(&normalized) else {
                return UNKNOWN_VENDOR.to_string();
            };

            if let Some(vendor) = Self::local_lookup(&oui) {
                return vendor.to_string();
            }

            self.remote_lookup(&oui)
                .await
                .unwrap_or_else(|| UNKNOWN_VENDOR.to_string())
        })
    }
}
