//! 设备标识
//!
//! 登录时需要提交一个稳定的 deviceId。取本机标识的 MD5 作为 UUID,
//! 同一台机器每次得到相同的值。

use uuid::Uuid;

const MACHINE_ID_PATHS: [&str; 2] = ["/etc/machine-id", "/var/lib/dbus/machine-id"];

/// 本机的设备ID
pub fn device_id() -> Uuid {
    from_seed(&machine_seed())
}

/// 由任意种子生成确定性的 UUID
pub fn from_seed(seed: &str) -> Uuid {
    let digest = md5::compute(seed.as_bytes());
    Uuid::from_bytes(digest.0)
}

fn machine_seed() -> String {
    for path in MACHINE_ID_PATHS {
        if let Ok(content) = std::fs::read_to_string(path) {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "famly-fetch".to_string())
}
