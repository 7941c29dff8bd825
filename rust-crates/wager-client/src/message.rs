//! Canonical text of the message a wallet signs for a relayed action.
//!
//! The relay re-derives this string independently and recovers the signer
//! from the signature, so field order and line terminators are a wire
//! contract. Any change here must be versioned via a new banner.

pub const MESSAGE_BANNER: &str = "GenLayer Wager Relayer";

/// Render the exact byte string signed for one action attempt.
pub fn sign_message_text(action: &str, address: &str, nonce: &str, timestamp: u64) -> String {
    format!(
        "{MESSAGE_BANNER}\nAction: {action}\nAddress: {address}\nNonce: {nonce}\nTimestamp: {timestamp}"
    )
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sign_message_text__matches_relay_template() {
        let text = sign_message_text("create", "0xabc", "deadbeef", 1_700_000_000);
        assert_eq!(
            text,
            "GenLayer Wager Relayer\n\
             Action: create\n\
             Address: 0xabc\n\
             Nonce: deadbeef\n\
             Timestamp: 1700000000"
        );
    }

    proptest! {
        #[test]
        fn sign_message_text__is_deterministic(
            action in "[a-z]{1,12}",
            address in "0x[0-9a-f]{40}",
            nonce in "[0-9a-f]{16}",
            timestamp in any::<u64>(),
        ) {
            let first = sign_message_text(&action, &address, &nonce, timestamp);
            let second = sign_message_text(&action, &address, &nonce, timestamp);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn sign_message_text__changes_when_any_field_changes(
            action in "[a-z]{1,12}",
            address in "0x[0-9a-f]{40}",
            nonce in "[0-9a-f]{16}",
            timestamp in 0u64..u64::MAX,
        ) {
            let base = sign_message_text(&action, &address, &nonce, timestamp);
            let other_action = format!("{action}x");
            let other_address = format!("{address}0");
            let other_nonce = format!("{nonce}0");
            prop_assert_ne!(&base, &sign_message_text(&other_action, &address, &nonce, timestamp));
            prop_assert_ne!(&base, &sign_message_text(&action, &other_address, &nonce, timestamp));
            prop_assert_ne!(&base, &sign_message_text(&action, &address, &other_nonce, timestamp));
            prop_assert_ne!(&base, &sign_message_text(&action, &address, &nonce, timestamp + 1));
        }
    }
}
