pub mod cache;
pub mod schema;

pub use cache::*;

/// 隐藏连接串中的密码用于日志输出
pub fn mask_password(url: &str) -> String {
    let authority_start = url.find("://").map(|p| p + 3).unwrap_or(0);
    let rest = &url[authority_start..];

    if let Some(at_pos) = rest.rfind('@') {
        if let Some(colon_pos) = rest[..at_pos].find(':') {
            let mut masked = url.to_string();
            masked.replace_range(
                authority_start + colon_pos + 1..authority_start + at_pos,
                "****",
            );
            return masked;
        }
    }
    url.to_string()
}
