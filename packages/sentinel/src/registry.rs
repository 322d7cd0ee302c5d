//! Address Registry
//!
//! Two-way asset ⇄ address catalogs for the two tracked venues (pairs and tokens
//! for each), plus the flat name → address wallet directory. Everything here is
//! built once at startup and only read afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors that can occur while loading catalogs
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One of the two integrated exchange ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Venue {
    /// Terraswap pairs and native-chain tokens
    Terra,
    /// Mirror protocol pairs and mAssets
    Mirror,
}

impl Venue {
    pub const ALL: [Venue; 2] = [Venue::Terra, Venue::Mirror];

    /// Prefix used in catalog file names and topics
    pub fn name(&self) -> &'static str {
        match self {
            Venue::Terra => "terra",
            Venue::Mirror => "mirror",
        }
    }

    /// The venue's own operating wallet
    pub fn operating_wallet(&self) -> WalletRole {
        match self {
            Venue::Terra => WalletRole::TerraWallet,
            Venue::Mirror => WalletRole::MirrorWallet,
        }
    }

    /// The counterparty watched as an "enemy" on this venue
    pub fn enemy_wallet(&self) -> WalletRole {
        match self {
            Venue::Terra => WalletRole::TerraEnemy,
            Venue::Mirror => WalletRole::MirrorEnemy,
        }
    }
}

/// Pair or token half of a venue's catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Pair,
    Token,
}

impl CatalogKind {
    fn suffix(&self) -> &'static str {
        match self {
            CatalogKind::Pair => "Pair",
            CatalogKind::Token => "Token",
        }
    }
}

/// File name of a catalog inside the configuration directory, e.g. `mirrorPair.json`
pub fn catalog_file_name(venue: Venue, kind: CatalogKind) -> String {
    format!("{}{}.json", venue.name(), kind.suffix())
}

/// File name of the wallet directory
pub const WALLET_FILE: &str = "wallet.json";

/// Money-market wrapper token, listed in the terra token catalog
pub const STABLE_YIELD_TOKEN: &str = "AUST";

/// Named entries of the wallet directory the pipeline relies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletRole {
    MirrorWallet,
    TerraWallet,
    TerraFactory,
    AstroFactory,
    MintContract,
    TerraEnemy,
    MirrorEnemy,
    Shuttle,
    AncContract,
    MirrorOracle,
    TerraContract,
}

impl WalletRole {
    /// Key of the role in `wallet.json`
    pub fn key(&self) -> &'static str {
        match self {
            WalletRole::MirrorWallet => "mirrorWallet",
            WalletRole::TerraWallet => "terraWallet",
            WalletRole::TerraFactory => "terraFactory",
            WalletRole::AstroFactory => "astroFactory",
            WalletRole::MintContract => "mintContract",
            WalletRole::TerraEnemy => "terraEnemy",
            WalletRole::MirrorEnemy => "mirrorEnemy",
            WalletRole::Shuttle => "shuttle",
            WalletRole::AncContract => "ancContract",
            WalletRole::MirrorOracle => "mirrorOracle",
            WalletRole::TerraContract => "terraContract",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub asset_name: String,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletEntry {
    pub name: String,
    pub address: String,
}

/// Catalog files come either wrapped (`{"contracts": [...]}`) or as a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { contracts: Vec<RegistryEntry> },
    Bare(Vec<RegistryEntry>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WalletFile {
    Wrapped { wallets: Vec<WalletEntry> },
    Bare(Vec<WalletEntry>),
}

/// Bidirectional asset name ⇄ address mapping
///
/// Assumes a bijection. A duplicated address keeps the last asset name seen, so
/// lookups for the shadowed name miss silently instead of failing.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_name: HashMap<String, String>,
    by_address: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry.asset_name, entry.address);
        }
        catalog
    }

    pub fn insert(&mut self, asset_name: impl Into<String>, address: impl Into<String>) {
        let asset_name = asset_name.into();
        let address = address.into();
        if let Some(previous) = self.by_address.get(&address) {
            if previous != &asset_name {
                warn!(
                    "Address {} already mapped to {}, remapping to {}",
                    address, previous, asset_name
                );
            }
        }
        self.by_name.insert(asset_name.clone(), address.clone());
        self.by_address.insert(address, asset_name);
    }

    /// Forward lookup: asset name → address
    pub fn address(&self, asset_name: &str) -> Option<&str> {
        self.by_name.get(asset_name).map(String::as_str)
    }

    /// Reverse lookup: address → asset name
    pub fn asset_name(&self, address: &str) -> Option<&str> {
        self.by_address.get(address).map(String::as_str)
    }

    pub fn contains_address(&self, address: &str) -> bool {
        self.by_address.contains_key(address)
    }

    /// Iterate `(asset name, address)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_name.iter().map(|(n, a)| (n.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn load(path: &Path) -> Result<Self, RegistryError> {
        let file: CatalogFile = read_json(path)?;
        let entries = match file {
            CatalogFile::Wrapped { contracts } => contracts,
            CatalogFile::Bare(entries) => entries,
        };
        Ok(Self::from_entries(entries))
    }
}

/// Name → address directory for wallets and well-known contracts
#[derive(Debug, Clone, Default)]
pub struct WalletDirectory {
    entries: HashMap<String, String>,
}

impl WalletDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = WalletEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.name, e.address)).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, address: impl Into<String>) {
        self.entries.insert(name.into(), address.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn address(&self, role: WalletRole) -> Option<&str> {
        self.get(role.key())
    }

    /// True only when the role is configured and equals `address`
    pub fn is(&self, role: WalletRole, address: &str) -> bool {
        self.address(role) == Some(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn load(path: &Path) -> Result<Self, RegistryError> {
        let file: WalletFile = read_json(path)?;
        let entries = match file {
            WalletFile::Wrapped { wallets } => wallets,
            WalletFile::Bare(entries) => entries,
        };
        Ok(Self::from_entries(entries))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RegistryError> {
    let bytes = fs::read(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| RegistryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// All catalogs and the wallet directory, immutable once built
#[derive(Debug, Clone, Default)]
pub struct AddressRegistry {
    pub terra_pairs: Catalog,
    pub terra_tokens: Catalog,
    pub mirror_pairs: Catalog,
    pub mirror_tokens: Catalog,
    pub wallets: WalletDirectory,
}

impl AddressRegistry {
    pub fn catalog(&self, venue: Venue, kind: CatalogKind) -> &Catalog {
        match (venue, kind) {
            (Venue::Terra, CatalogKind::Pair) => &self.terra_pairs,
            (Venue::Terra, CatalogKind::Token) => &self.terra_tokens,
            (Venue::Mirror, CatalogKind::Pair) => &self.mirror_pairs,
            (Venue::Mirror, CatalogKind::Token) => &self.mirror_tokens,
        }
    }

    pub fn catalog_mut(&mut self, venue: Venue, kind: CatalogKind) -> &mut Catalog {
        match (venue, kind) {
            (Venue::Terra, CatalogKind::Pair) => &mut self.terra_pairs,
            (Venue::Terra, CatalogKind::Token) => &mut self.terra_tokens,
            (Venue::Mirror, CatalogKind::Pair) => &mut self.mirror_pairs,
            (Venue::Mirror, CatalogKind::Token) => &mut self.mirror_tokens,
        }
    }

    pub fn pairs(&self, venue: Venue) -> &Catalog {
        self.catalog(venue, CatalogKind::Pair)
    }

    pub fn tokens(&self, venue: Venue) -> &Catalog {
        self.catalog(venue, CatalogKind::Token)
    }

    /// Address of the money-market wrapper token, if configured
    pub fn stable_yield_token(&self) -> Option<&str> {
        self.terra_tokens.address(STABLE_YIELD_TOKEN)
    }

    /// Whether `address` is a pair or token of `venue`
    pub fn is_venue_contract(&self, venue: Venue, address: &str) -> bool {
        self.pairs(venue).contains_address(address) || self.tokens(venue).contains_address(address)
    }

    /// Load every catalog from `dir`, degrading to empty catalogs on failure.
    ///
    /// Failures are logged. An empty catalog silently disables the classification
    /// that depends on it; use [`AddressRegistry::load_strict`] to fail instead.
    pub fn load(dir: &Path) -> Self {
        let mut registry = Self::default();
        for venue in Venue::ALL {
            for kind in [CatalogKind::Pair, CatalogKind::Token] {
                let path = dir.join(catalog_file_name(venue, kind));
                match Catalog::load(&path) {
                    Ok(catalog) => *registry.catalog_mut(venue, kind) = catalog,
                    Err(e) => error!("Catalog load failed, continuing with empty catalog: {}", e),
                }
            }
        }
        match WalletDirectory::load(&dir.join(WALLET_FILE)) {
            Ok(wallets) => registry.wallets = wallets,
            Err(e) => error!("Wallet load failed, continuing with empty directory: {}", e),
        }
        registry.log_summary();
        registry
    }

    /// Load every catalog from `dir`, failing on the first missing or corrupt file
    pub fn load_strict(dir: &Path) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for venue in Venue::ALL {
            for kind in [CatalogKind::Pair, CatalogKind::Token] {
                *registry.catalog_mut(venue, kind) =
                    Catalog::load(&dir.join(catalog_file_name(venue, kind)))?;
            }
        }
        registry.wallets = WalletDirectory::load(&dir.join(WALLET_FILE))?;
        registry.log_summary();
        Ok(registry)
    }

    fn log_summary(&self) {
        info!(
            terra_pairs = self.terra_pairs.len(),
            terra_tokens = self.terra_tokens.len(),
            mirror_pairs = self.mirror_pairs.len(),
            mirror_tokens = self.mirror_tokens.len(),
            wallets = self.wallets.len(),
            "Address registry loaded"
        );
    }
}
