use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Human-facing record ids: prefix + last six digits of the epoch millis +
/// three random digits, e.g. `LD483920117`.
fn tagged_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
        .to_string();
    let tail: String = millis
        .chars()
        .rev()
        .take(6)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let random = rand::rng().random_range(0..1000u32);
    format!("{}{}{:03}", prefix, tail, random)
}

pub fn lead_id() -> String {
    tagged_id("LD")
}

pub fn task_id() -> String {
    tagged_id("TK")
}

pub fn person_id() -> String {
    tagged_id("SP")
}

/// Client ids are year-scoped counters: `CLIENT-2025-0001`.
pub fn client_id(year: i32, next_number: i64) -> String {
    format!("CLIENT-{}-{:04}", year, next_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_ids_carry_prefix_and_length() {
        let id = lead_id();
        assert!(id.starts_with("LD"));
        assert_eq!(id.len(), 11);
        assert!(id[2..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn client_ids_are_year_scoped_and_zero_padded() {
        assert_eq!(client_id(2025, 1), "CLIENT-2025-0001");
        assert_eq!(client_id(2025, 123), "CLIENT-2025-0123");
        assert_eq!(client_id(2026, 10000), "CLIENT-2026-10000");
    }
}
