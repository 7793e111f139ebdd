use serde_json::Value;

use crate::types::TradeSide;

/// Placeholder shown when an account's user profile can't be read.
pub const ANON: &str = "Anon";

/// Length of the address prefix shown for accounts without a username.
const ADDRESS_PREFIX_LEN: usize = 6;

/// Outcome of looking up a counterparty's marketplace username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterpartyName {
    /// `<account>.user.username` is a string.
    Found(String),
    /// The user object exists but its username is `null`.
    Unnamed,
    /// The path is missing, or some level of it isn't an object.
    NotFound,
}

/// Read `winner_account.user.username` (buyer) or `seller.user.username` (seller).
///
/// Never fails: anything other than a present username becomes `Unnamed` or `NotFound`.
pub fn resolve(side: TradeSide, record: &Value) -> CounterpartyName {
    let username = record
        .get(side.account_key())
        .and_then(|account| account.get("user"))
        .and_then(|user| user.get("username"));

    match username {
        Some(Value::String(name)) => CounterpartyName::Found(name.clone()),
        Some(Value::Null) => CounterpartyName::Unnamed,
        _ => CounterpartyName::NotFound,
    }
}

impl CounterpartyName {
    /// Name shown in announcements.
    ///
    /// `NotFound` shows as "Anon"; only `Unnamed` falls back to the address prefix.
    pub fn display(&self, address: &str) -> String {
        match self {
            CounterpartyName::Found(name) => name.clone(),
            CounterpartyName::Unnamed => address.chars().take(ADDRESS_PREFIX_LEN).collect(),
            CounterpartyName::NotFound => ANON.to_string(),
        }
    }
}

/// Resolve and render the display name for one side of a sale.
pub fn display_name(side: TradeSide, record: &Value, address: &str) -> String {
    resolve(side, record).display(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "winner_account": {"user": {"username": "kongcollector"}, "address": "0xbuyer0001"},
            "seller": {"user": {"username": "paperhands"}, "address": "0xseller001"},
        })
    }

    #[test]
    fn found_for_both_sides() {
        let r = record();
        assert_eq!(
            resolve(TradeSide::Buyer, &r),
            CounterpartyName::Found("kongcollector".into())
        );
        assert_eq!(
            resolve(TradeSide::Seller, &r),
            CounterpartyName::Found("paperhands".into())
        );
    }

    #[test]
    fn anon_when_path_absent_at_any_depth() {
        let cases = [
            json!({}),
            json!({"winner_account": null}),
            json!({"winner_account": {"address": "0x1"}}),
            json!({"winner_account": {"user": null, "address": "0x1"}}),
            json!({"winner_account": {"user": {}, "address": "0x1"}}),
            json!({"winner_account": {"user": "bob", "address": "0x1"}}),
            json!({"winner_account": {"user": {"username": 42}}}),
        ];
        for case in &cases {
            assert_eq!(resolve(TradeSide::Buyer, case), CounterpartyName::NotFound, "{case}");
            assert_eq!(display_name(TradeSide::Buyer, case, "0x1234567"), "Anon");
        }
    }

    #[test]
    fn sides_do_not_leak() {
        let r = json!({"seller": {"user": {"username": "only-seller"}}});
        assert_eq!(resolve(TradeSide::Buyer, &r), CounterpartyName::NotFound);
        assert_eq!(
            resolve(TradeSide::Seller, &r),
            CounterpartyName::Found("only-seller".into())
        );
    }

    #[test]
    fn null_username_falls_back_to_address_prefix() {
        let r = json!({"seller": {"user": {"username": null}, "address": "0xabcdef1234"}});
        assert_eq!(resolve(TradeSide::Seller, &r), CounterpartyName::Unnamed);
        assert_eq!(display_name(TradeSide::Seller, &r, "0xabcdef1234"), "0xabcd");
    }

    #[test]
    fn short_address_prefix() {
        assert_eq!(CounterpartyName::Unnamed.display("0x1"), "0x1");
    }
}
