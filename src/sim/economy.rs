//! Currency balances, upgrade pricing and the skin catalog
//!
//! Purchases never fail loudly: not having enough currency is a normal
//! outcome reported as [`PurchaseOutcome::InsufficientFunds`] with no state
//! change.

use serde::{Deserialize, Serialize};

use crate::tuning::{Tuning, UpgradeTuning};

/// Upgradeable cannon stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Damage,
    Speed,
    Piercing,
    Multishot,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Damage,
        UpgradeKind::Speed,
        UpgradeKind::Piercing,
        UpgradeKind::Multishot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Damage => "damage",
            UpgradeKind::Speed => "speed",
            UpgradeKind::Piercing => "piercing",
            UpgradeKind::Multishot => "multishot",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        UpgradeKind::ALL.into_iter().find(|k| k.as_str() == s)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One upgrade track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upgrade {
    pub kind: UpgradeKind,
    /// Current level, starts at 1 and only increases
    pub level: u32,
    /// Coin price of the next level
    pub cost: u64,
    pub cost_growth: f64,
    pub effect_multiplier: f64,
}

impl Upgrade {
    pub fn new(kind: UpgradeKind, tuning: &UpgradeTuning) -> Self {
        Self {
            kind,
            level: 1,
            cost: tuning.initial_cost,
            cost_growth: tuning.cost_growth,
            effect_multiplier: tuning.effect_multiplier,
        }
    }

    /// Move to the next level and reprice
    fn advance(&mut self) {
        self.level += 1;
        let next = (self.cost as f64 * self.cost_growth).floor() as u64;
        self.cost = next.max(self.cost);
    }
}

/// floor(base * multiplier^(level - 1))
pub fn scaled_stat(base: f64, multiplier: f64, level: u32) -> f64 {
    (base * multiplier.powi(level.saturating_sub(1) as i32)).floor()
}

/// Result of a purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOutcome {
    /// Currency was debited
    Purchased,
    /// Skin already owned; it is now the active skin
    Equipped,
    /// Not enough currency, nothing changed
    InsufficientFunds,
}

/// Cosmetic cannon skins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SkinId {
    #[default]
    Classic,
    Plasma,
    Fire,
    Ice,
    Golden,
    Rainbow,
}

/// Color a skin paints the cannon and its shots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkinColor {
    /// 0xRRGGBB
    Solid(u32),
    /// Hue cycles over time
    Rainbow,
}

impl SkinId {
    pub const ALL: [SkinId; 6] = [
        SkinId::Classic,
        SkinId::Plasma,
        SkinId::Fire,
        SkinId::Ice,
        SkinId::Golden,
        SkinId::Rainbow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SkinId::Classic => "Classic",
            SkinId::Plasma => "Plasma",
            SkinId::Fire => "Fire",
            SkinId::Ice => "Ice",
            SkinId::Golden => "Golden",
            SkinId::Rainbow => "Rainbow",
        }
    }

    /// Diamond price
    pub fn cost(&self) -> u64 {
        match self {
            SkinId::Classic => 0,
            SkinId::Plasma => 50,
            SkinId::Fire => 100,
            SkinId::Ice => 150,
            SkinId::Golden => 300,
            SkinId::Rainbow => 500,
        }
    }

    pub fn color(&self) -> SkinColor {
        match self {
            SkinId::Classic => SkinColor::Solid(0xff6b35),
            SkinId::Plasma => SkinColor::Solid(0x00ffff),
            SkinId::Fire => SkinColor::Solid(0xff0000),
            SkinId::Ice => SkinColor::Solid(0x87ceeb),
            SkinId::Golden => SkinColor::Solid(0xffd700),
            SkinId::Rainbow => SkinColor::Rainbow,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        SkinId::ALL
            .into_iter()
            .find(|skin| skin.name().eq_ignore_ascii_case(s))
    }
}

/// Currency balances, upgrade tracks and skin ownership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub coins: u64,
    pub diamonds: u64,
    upgrades: [Upgrade; 4],
    owned_skins: Vec<SkinId>,
    active_skin: SkinId,
}

impl Ledger {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            coins: 0,
            diamonds: 0,
            upgrades: UpgradeKind::ALL.map(|kind| Upgrade::new(kind, tuning.upgrade(kind))),
            owned_skins: vec![SkinId::Classic],
            active_skin: SkinId::Classic,
        }
    }

    /// Start a fresh run: coins and upgrades reset, diamonds and skins stay
    pub fn reset_run(&mut self, tuning: &Tuning) {
        self.coins = 0;
        self.upgrades = UpgradeKind::ALL.map(|kind| Upgrade::new(kind, tuning.upgrade(kind)));
    }

    pub fn upgrade(&self, kind: UpgradeKind) -> &Upgrade {
        &self.upgrades[kind.index()]
    }

    pub fn upgrades(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.iter()
    }

    /// Whether the next level of `kind` is affordable right now
    pub fn can_afford(&self, kind: UpgradeKind) -> bool {
        self.coins >= self.upgrade(kind).cost
    }

    /// Buy the next level of an upgrade.
    ///
    /// The caller is responsible for refreshing any derived cannon stats.
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> PurchaseOutcome {
        if !self.can_afford(kind) {
            return PurchaseOutcome::InsufficientFunds;
        }
        let upgrade = &mut self.upgrades[kind.index()];
        self.coins -= upgrade.cost;
        upgrade.advance();
        PurchaseOutcome::Purchased
    }

    pub fn owns(&self, skin: SkinId) -> bool {
        self.owned_skins.contains(&skin)
    }

    pub fn active_skin(&self) -> SkinId {
        self.active_skin
    }

    /// Buy (or switch to an owned) skin
    pub fn purchase_skin(&mut self, skin: SkinId) -> PurchaseOutcome {
        if self.owns(skin) {
            self.active_skin = skin;
            return PurchaseOutcome::Equipped;
        }
        if self.diamonds < skin.cost() {
            return PurchaseOutcome::InsufficientFunds;
        }
        self.diamonds -= skin.cost();
        self.owned_skins.push(skin);
        self.active_skin = skin;
        PurchaseOutcome::Purchased
    }
}
