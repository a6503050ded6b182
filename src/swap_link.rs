use crate::config::{CHAIN_ID, SWAP_FEE_BPS};

pub const SWAP_UI_URL: &str = "https://matcha.xyz/trade";

/// Native asset the swap sells into the token.
pub const SELL_TOKEN: &str = "ETH";

/// Matcha (0x) trade link buying `token_address` with ETH, routing the
/// referral fee to `fee_recipient`.
pub fn build_swap_link(token_address: &str, fee_recipient: &str) -> String {
    format!(
        "{SWAP_UI_URL}?chain={CHAIN_ID}&sellToken={SELL_TOKEN}&buyToken={token_address}\
         &swapFeeRecipient={fee_recipient}&swapFeeBps={SWAP_FEE_BPS}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_embeds_token_and_referral() {
        let link = build_swap_link("0xabc", "0xfee");
        assert_eq!(
            link,
            "https://matcha.xyz/trade?chain=base&sellToken=ETH&buyToken=0xabc&swapFeeRecipient=0xfee&swapFeeBps=10"
        );
    }

    #[test]
    fn missing_wallet_leaves_recipient_blank() {
        assert!(build_swap_link("0xabc", "").contains("&swapFeeRecipient=&swapFeeBps=10"));
    }
}
