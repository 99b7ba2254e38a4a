//! User-agent string parsing.
//!
//! Extracts the five device dimensions from a user-agent string without
//! external databases. Order matters throughout: tablets are checked before
//! phones (Android tablets lack the `Mobile` token), iOS before macOS (iOS
//! agents contain "like Mac OS X"), and Edge/Opera before Chrome (both embed
//! a `Chrome/` token).

use sessiongate_entity::DeviceInfo;
use sessiongate_entity::device::UNKNOWN_ATTRIBUTE;

/// Parse a user-agent string into device dimension values.
pub fn parse_user_agent(user_agent: &str) -> DeviceInfo {
    let trimmed = user_agent.trim();
    if trimmed.is_empty() {
        return DeviceInfo::unknown();
    }

    let lower = trimmed.to_lowercase();
    let bot = is_bot(&lower);

    DeviceInfo {
        class: if bot { "bot" } else { "human" }.to_string(),
        device_type: detect_device_type(&lower).to_string(),
        client: detect_client(trimmed, bot).to_string(),
        browser: detect_browser(trimmed).to_string(),
        os: detect_os(trimmed).to_string(),
    }
}

/// Crawler detection via the usual self-identification tokens.
fn is_bot(lower: &str) -> bool {
    ["bot", "crawler", "spider", "slurp", "curl/", "wget/"]
        .iter()
        .any(|token| lower.contains(token))
}

/// Hardware form factor: `desktop`, `mobile`, or `tablet`.
fn detect_device_type(lower: &str) -> &'static str {
    // Tablets first: iPads and Android tablets (no "mobile" token).
    if lower.contains("ipad") || (lower.contains("android") && !lower.contains("mobile")) {
        return "tablet";
    }

    if lower.contains("mobile")
        || lower.contains("iphone")
        || lower.contains("ipod")
        || lower.contains("android")
        || lower.contains("windows phone")
    {
        return "mobile";
    }

    if lower.contains("mozilla/") || lower.contains("opera/") {
        return "desktop";
    }

    UNKNOWN_ATTRIBUTE
}

/// Client software category: `browser`, `app`, or `crawler`.
fn detect_client(ua: &str, bot: bool) -> &'static str {
    if bot {
        return "crawler";
    }

    // Native app webviews and API clients.
    if ua.contains("wv)")
        || ua.contains("Dalvik/")
        || ua.contains("CFNetwork/")
        || ua.contains("okhttp/")
    {
        return "app";
    }

    if ua.contains("Mozilla/") || ua.contains("Opera/") {
        return "browser";
    }

    UNKNOWN_ATTRIBUTE
}

/// Browser product name.
fn detect_browser(ua: &str) -> &'static str {
    // Specific before generic: Edge and Opera embed a Chrome token, Chrome
    // embeds a Safari token.
    if ua.contains("Edg/") || ua.contains("Edge/") {
        return "edge";
    }
    if ua.contains("OPR/") || ua.contains("Opera/") {
        return "opera";
    }
    if ua.contains("Firefox/") {
        return "firefox";
    }
    if ua.contains("Chrome/") && !ua.contains("Chromium") {
        return "chrome";
    }
    if ua.contains("Safari/") && !ua.contains("Chrome") && !ua.contains("Chromium") {
        return "safari";
    }
    if ua.contains("MSIE") || ua.contains("Trident/") {
        return "internet_explorer";
    }

    UNKNOWN_ATTRIBUTE
}

/// Operating system name.
fn detect_os(ua: &str) -> &'static str {
    // iOS before macOS: iOS agents contain "like Mac OS X".
    if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
        return "ios";
    }
    if ua.contains("Windows") {
        return "windows";
    }
    if ua.contains("Macintosh") || ua.contains("Mac OS X") {
        return "macos";
    }
    if ua.contains("Android") {
        return "android";
    }
    if ua.contains("CrOS") {
        return "chrome_os";
    }
    if ua.contains("Linux") {
        return "linux";
    }

    UNKNOWN_ATTRIBUTE
}
