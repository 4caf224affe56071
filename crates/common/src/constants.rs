//! Universal constants for Vantage.

/// Moralis Data API base URL.
pub const MORALIS_API_BASE: &str = "https://deep-index.moralis.io/api/v2.2";

/// DexScreener public API base URL (price fallback, no auth).
pub const DEXSCREENER_API_BASE: &str = "https://api.dexscreener.com/latest/dex";

/// Fallback token logo — generated avatar keyed by symbol (appended by caller).
pub const DEFAULT_TOKEN_LOGO_BASE: &str = "https://ui-avatars.com/api/?background=random&name=";

/// Chain icons served with portfolio snapshots.
pub const ICON_ETHEREUM: &str = "https://cryptologos.cc/logos/ethereum-eth-logo.png";
pub const ICON_SOLANA: &str = "https://cryptologos.cc/logos/solana-sol-logo.png";
pub const ICON_BNB: &str = "https://cryptologos.cc/logos/bnb-bnb-logo.png";
pub const ICON_POLYGON: &str = "https://cryptologos.cc/logos/polygon-matic-logo.png";
pub const ICON_AVALANCHE: &str = "https://cryptologos.cc/logos/avalanche-avax-logo.png";
pub const ICON_BASE: &str = "https://cryptologos.cc/logos/base-base-logo.png";
pub const ICON_ARBITRUM: &str = "https://cryptologos.cc/logos/arbitrum-arb-logo.png";
pub const ICON_OPTIMISM: &str = "https://cryptologos.cc/logos/optimism-ethereum-op-logo.png";

/// Icon for chains outside the known set.
pub const ICON_DEFAULT: &str = ICON_ETHEREUM;
