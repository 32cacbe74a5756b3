//! Row ordering and search filtering.
//!
//! Cells are compared with a cascade that suits the data tables usually
//! hold: all-digit strings compare as numbers, IP addresses compare as
//! addresses (IPv4 before IPv6), everything else compares bytewise.

use std::cmp::Ordering;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use regex::{Regex, RegexBuilder};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Forward,
    /// Descending.
    Reverse,
}

impl SortOrder {
    /// Apply the direction to an ascending comparison result.
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Forward => ordering,
            Self::Reverse => ordering.reverse(),
        }
    }
}

/// Compare two cell values in ascending order.
///
/// A missing value sorts before any present value and two missing values
/// are equal. This never fails: values that fit no typed comparison fall
/// back to plain string order.
#[must_use]
pub fn compare_values(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

fn compare_present(a: &str, b: &str) -> Ordering {
    if is_all_digits(a) && is_all_digits(b) {
        return compare_digits(a, b);
    }
    if let (Some(ip_a), Some(ip_b)) = (parse_ip(a), parse_ip(b)) {
        return compare_ips(ip_a, ip_b);
    }
    a.cmp(b)
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric comparison of digit strings of any length.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_ips(a: IpAddr, b: IpAddr) -> Ordering {
    match (a, b) {
        (IpAddr::V4(a), IpAddr::V4(b)) => a.cmp(&b),
        (IpAddr::V6(a), IpAddr::V6(b)) => a.cmp(&b),
        (IpAddr::V4(_), IpAddr::V6(_)) => Ordering::Less,
        (IpAddr::V6(_), IpAddr::V4(_)) => Ordering::Greater,
    }
}

/// Parse an address, optionally in `address/prefix` form.
///
/// With a prefix the address is masked down to its network, so
/// `10.1.2.3/8` sorts as `10.0.0.0`.
fn parse_ip(value: &str) -> Option<IpAddr> {
    let (addr, prefix) = match value.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix.parse::<u32>().ok()?)),
        None => (value, None),
    };
    let addr: IpAddr = addr.parse().ok()?;
    let Some(prefix) = prefix else {
        return Some(addr);
    };
    match addr {
        IpAddr::V4(v4) if prefix <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
            Some(IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask)))
        }
        IpAddr::V6(v6) if prefix <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix).unwrap_or(0);
            Some(IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask)))
        }
        _ => None,
    }
}

/// Stable order of `len` items under `compare`, as a permutation of
/// `0..len`.
///
/// [`compare_values`] is not transitive across value kinds (`9 < 10`
/// numerically, `10 < 10.0.0.1` and `10.0.0.1 < 9` bytewise), so the
/// standard library sorts may panic on it. This bottom-up merge sort only
/// ever asks `compare` about pairs and always terminates with every index
/// exactly once; ties keep their input order.
pub fn stable_order_by<F>(len: usize, mut compare: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut order: Vec<usize> = (0..len).collect();
    let mut buffer = order.clone();
    let mut run = 1;
    while run < len {
        for start in (0..len).step_by(2 * run) {
            let mid = (start + run).min(len);
            let end = (start + 2 * run).min(len);
            merge_runs(
                &order[start..mid],
                &order[mid..end],
                &mut buffer[start..end],
                &mut compare,
            );
        }
        std::mem::swap(&mut order, &mut buffer);
        run *= 2;
    }
    order
}

fn merge_runs<F>(left: &[usize], right: &[usize], out: &mut [usize], compare: &mut F)
where
    F: FnMut(usize, usize) -> Ordering,
{
    let (mut i, mut j) = (0, 0);
    for slot in out {
        let take_left =
            j == right.len() || (i < left.len() && compare(right[j], left[i]) != Ordering::Less);
        if take_left {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

/// Row visibility filter.
///
/// The pattern is a regular expression matched case-insensitively against
/// a row's cells joined by single spaces; `^`/`$` match at line boundaries
/// and `.` matches newlines.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    pattern: Regex,
}

impl SearchFilter {
    /// Compile a filter.
    ///
    /// # Errors
    ///
    /// Returns the [`regex::Error`] if `pattern` is not a valid regular
    /// expression.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .dot_matches_new_line(true)
            .build()?;
        Ok(Self { pattern })
    }

    /// The source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether a row with these cells is visible.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, cells: &[S]) -> bool {
        let joined = cells
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(" ");
        let visible = self.pattern.is_match(&joined);
        log::trace!("search {:?} on {joined:?}: {visible}", self.pattern.as_str());
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(values: &[&str], order: SortOrder) -> Vec<String> {
        stable_order_by(values.len(), |a, b| {
            order.apply(compare_values(Some(values[a]), Some(values[b])))
        })
        .into_iter()
        .map(|i| values[i].to_string())
        .collect()
    }

    #[test]
    fn test_numeric_before_lexical() {
        assert_eq!(sorted(&["10", "9", "bob"], SortOrder::Forward), ["9", "10", "bob"]);
        assert_eq!(sorted(&["10", "9", "bob"], SortOrder::Reverse), ["bob", "10", "9"]);
    }

    #[test]
    fn test_digits_of_any_length() {
        let big = "123456789012345678901234567890";
        assert_eq!(compare_values(Some(big), Some("99")), Ordering::Greater);
        assert_eq!(compare_values(Some("007"), Some("7")), Ordering::Equal);
        assert_eq!(compare_values(Some("0"), Some("00")), Ordering::Equal);
    }

    #[test]
    fn test_ip_ordering() {
        assert_eq!(
            sorted(&["10.0.0.10", "10.0.0.9", "::1", "192.168.1.1"], SortOrder::Forward),
            ["10.0.0.9", "10.0.0.10", "192.168.1.1", "::1"]
        );
        assert_eq!(
            compare_values(Some("fe80::1"), Some("1.2.3.4")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_ip_prefix_is_masked() {
        assert_eq!(parse_ip("10.1.2.3/8"), Some("10.0.0.0".parse().unwrap()));
        assert_eq!(parse_ip("10.1.2.3/0"), Some("0.0.0.0".parse().unwrap()));
        assert_eq!(parse_ip("fe80::1/16"), Some("fe80::".parse().unwrap()));
        assert_eq!(parse_ip("10.1.2.3/33"), None);
        assert_eq!(parse_ip("10.1.2.3/x"), None);
        assert_eq!(parse_ip("host.example"), None);
    }

    #[test]
    fn test_missing_values_first() {
        assert_eq!(compare_values(None, Some("a")), Ordering::Less);
        assert_eq!(compare_values(Some("a"), None), Ordering::Greater);
        assert_eq!(compare_values(None, None), Ordering::Equal);
    }

    #[test]
    fn test_mixed_falls_back_to_lexical() {
        assert_eq!(compare_values(Some("10"), Some("10.0.0.1")), Ordering::Less);
        assert_eq!(compare_values(Some("abc"), Some("abd")), Ordering::Less);
        assert_eq!(compare_values(Some("Z"), Some("a")), Ordering::Less);
    }

    #[test]
    fn test_stable_order_keeps_ties_in_input_order() {
        let keys = [3, 1, 2, 1, 3, 2, 1];
        let order = stable_order_by(keys.len(), |a, b| keys[a].cmp(&keys[b]));
        assert_eq!(order, [1, 3, 6, 2, 5, 0, 4]);
        assert!(stable_order_by(0, |_, _| Ordering::Less).is_empty());
    }

    #[test]
    fn test_stable_order_survives_cyclic_comparisons() {
        // 9 < 10 numerically, 10 < 10.0.0.1 and 10.0.0.1 < 9 bytewise.
        let mut values: Vec<String> = Vec::new();
        for i in 0..1200 {
            values.push(match i % 3 {
                0 => (i * 7 % 997).to_string(),
                1 => format!("{}.{}.0.1", i % 250, i % 13),
                _ => format!("{}x", i % 37),
            });
        }
        let order = stable_order_by(values.len(), |a, b| {
            compare_values(Some(&values[a]), Some(&values[b]))
        });
        let mut seen = order.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..values.len()).collect::<Vec<_>>());

        let digits: Vec<u64> = order
            .iter()
            .filter_map(|&i| values[i].parse::<u64>().ok())
            .collect();
        assert_eq!(digits.len(), 400);
    }

    #[test]
    fn test_search_filter() {
        let filter = SearchFilter::new("ali").unwrap();
        assert!(filter.matches(&["Alice", "30"]));
        assert!(!filter.matches(&["Bob", "25"]));

        let joined = SearchFilter::new("bob 25").unwrap();
        assert!(joined.matches(&["Bob", "25"]));

        let anchored = SearchFilter::new("^second$").unwrap();
        assert!(anchored.matches(&["first\nsecond"]));
    }

    #[test]
    fn test_invalid_search_pattern() {
        assert!(SearchFilter::new("(unclosed").is_err());
        assert!(SearchFilter::new("[a-").is_err());
    }
}
