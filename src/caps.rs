//! Capability resolution: which wide-SIMD tiers this build can use.
//!
//! The resolver classifies the target architecture into a small set of
//! families and derives the instruction-set tiers each family implies:
//!
//! | Family    | 128-bit tier            | 256-bit tier        |
//! |-----------|-------------------------|---------------------|
//! | `X86_64`  | SSE (baseline)          | AVX if enabled      |
//! | `X86`     | SSE if `sse2` enabled   | AVX if enabled      |
//! | `Aarch64` | NEON (baseline)         | -                   |
//! | `Arm`     | NEON if `neon` enabled  | -                   |
//! | `Unknown` | -                       | -                   |
//!
//! Resolution is a pure function of the compile target (see
//! [`Caps::compile_time`]). With the `runtime-detect` feature the AVX tier is
//! additionally probed on the running CPU. Either way the process-wide value
//! returned by [`caps()`] is computed once and never changes.
//!
//! An unrecognized architecture is not an error: it resolves to no
//! accelerated tier and every kernel runs its scalar path.

use std::fmt;
use std::sync::OnceLock;

// ============================================================================
// Architecture family
// ============================================================================

/// CPU architecture family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86 (`x86_64`)
    X86_64,
    /// 32-bit x86 (`x86`)
    X86,
    /// 64-bit ARM (`aarch64`)
    Aarch64,
    /// 32-bit ARM (`arm`)
    Arm,
    /// Anything else
    Unknown,
}

impl Arch {
    /// Architecture family of the compile target.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_arch = "x86_64") {
            Arch::X86_64
        } else if cfg!(target_arch = "x86") {
            Arch::X86
        } else if cfg!(target_arch = "aarch64") {
            Arch::Aarch64
        } else if cfg!(target_arch = "arm") {
            Arch::Arm
        } else {
            Arch::Unknown
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::X86 => "x86",
            Arch::Aarch64 => "aarch64",
            Arch::Arm => "arm",
            Arch::Unknown => "unknown",
        }
    }

    /// Tiers the family can offer when its SIMD extension is present.
    ///
    /// Whether a tier is usable on this build is decided by [`Caps`], which
    /// only ever enables tiers listed here.
    #[must_use]
    pub const fn family_tiers(self) -> &'static [Tier] {
        match self {
            Arch::X86_64 | Arch::X86 => &[Tier::Sse, Tier::Avx],
            Arch::Aarch64 | Arch::Arm => &[Tier::Neon],
            Arch::Unknown => &[],
        }
    }

    /// Is `tier` one of [`family_tiers`](Arch::family_tiers)?
    #[must_use]
    pub const fn offers(self, tier: Tier) -> bool {
        let tiers = self.family_tiers();
        let mut i = 0;
        while i < tiers.len() {
            if tiers[i] as u8 == tier as u8 {
                return true;
            }
            i += 1;
        }
        false
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tiers
// ============================================================================

/// A wide-SIMD instruction-set tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// x86 128-bit SSE (4 x f32)
    Sse,
    /// x86 256-bit AVX (8 x f32)
    Avx,
    /// ARM 128-bit NEON (4 x f32)
    Neon,
}

impl Tier {
    /// Register width in bits.
    #[must_use]
    pub const fn bits(self) -> usize {
        match self {
            Tier::Sse | Tier::Neon => 128,
            Tier::Avx => 256,
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Tier::Sse => "sse",
            Tier::Avx => "avx",
            Tier::Neon => "neon",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Capability set
// ============================================================================

/// Immutable set of available SIMD tiers.
///
/// A `Caps` value can only be produced by the resolver ([`Caps::compile_time`],
/// [`Caps::detect`], [`caps()`]) or narrowed from one ([`Caps::without`],
/// [`Caps::scalar`]). There is no way to add a tier, so a `Caps` never claims
/// an instruction set the machine cannot execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Caps {
    arch: Arch,
    sse: bool,
    avx: bool,
    neon: bool,
}

impl Caps {
    /// Capabilities implied by the compile target alone.
    ///
    /// Uses `cfg!` only, so this evaluates to a constant.
    #[must_use]
    pub const fn compile_time() -> Self {
        let arch = Arch::current();
        // 128-bit tiers are baseline on the 64-bit families
        let sse = arch.offers(Tier::Sse)
            && match arch {
                Arch::X86 => cfg!(target_feature = "sse2"),
                _ => true,
            };
        let neon = arch.offers(Tier::Neon)
            && match arch {
                Arch::Arm => cfg!(target_feature = "neon"),
                _ => true,
            };
        let avx = sse && arch.offers(Tier::Avx) && cfg!(target_feature = "avx");
        Caps {
            arch,
            sse,
            avx,
            neon,
        }
    }

    /// Capabilities with every accelerated tier removed.
    #[must_use]
    pub const fn scalar() -> Self {
        Caps {
            arch: Arch::current(),
            sse: false,
            avx: false,
            neon: false,
        }
    }

    /// Compile-time capabilities, upgraded by probing the running CPU when the
    /// `runtime-detect` feature is enabled.
    #[must_use]
    pub fn detect() -> Self {
        #[allow(unused_mut)]
        let mut caps = Self::compile_time();

        #[cfg(all(
            feature = "runtime-detect",
            any(target_arch = "x86", target_arch = "x86_64")
        ))]
        {
            if caps.sse && !caps.avx && std::arch::is_x86_feature_detected!("avx") {
                caps.avx = true;
            }
        }

        caps
    }

    /// Architecture family these capabilities were resolved for.
    #[must_use]
    pub const fn arch(self) -> Arch {
        self.arch
    }

    /// Is `tier` available?
    #[must_use]
    pub const fn has(self, tier: Tier) -> bool {
        match tier {
            Tier::Sse => self.sse,
            Tier::Avx => self.avx,
            Tier::Neon => self.neon,
        }
    }

    /// Same capabilities with `tier` removed.
    ///
    /// Removing the 128-bit SSE tier also removes AVX, since the 256-bit
    /// kernels fall back to SSE for operations they do not cover.
    #[must_use]
    pub const fn without(self, tier: Tier) -> Self {
        let mut caps = self;
        match tier {
            Tier::Sse => {
                caps.sse = false;
                caps.avx = false;
            }
            Tier::Avx => caps.avx = false,
            Tier::Neon => caps.neon = false,
        }
        caps
    }

    /// Returns true if no accelerated tier is available.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !(self.sse || self.avx || self.neon)
    }

    /// Widest available tier, if any.
    #[must_use]
    pub const fn widest(self) -> Option<Tier> {
        if self.avx {
            Some(Tier::Avx)
        } else if self.sse {
            Some(Tier::Sse)
        } else if self.neon {
            Some(Tier::Neon)
        } else {
            None
        }
    }

    /// Iterate over the available tiers, widest first.
    pub fn tiers(self) -> impl Iterator<Item = Tier> {
        [Tier::Avx, Tier::Sse, Tier::Neon]
            .into_iter()
            .filter(move |&t| self.has(t))
    }
}

impl Default for Caps {
    fn default() -> Self {
        caps()
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.arch)?;
        let mut first = true;
        for tier in self.tiers() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}", tier)?;
            first = false;
        }
        if first {
            f.write_str("scalar")?;
        }
        f.write_str("]")
    }
}

/// Process-wide capabilities, resolved on first call.
#[must_use]
pub fn caps() -> Caps {
    static CAPS: OnceLock<Caps> = OnceLock::new();
    *CAPS.get_or_init(|| {
        let caps = Caps::detect();
        log::debug!("resolved SIMD capabilities: {}", caps);
        caps
    })
}
