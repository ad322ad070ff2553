use kernel_memory_addresses::PhysicalAddress;
use log::{info, warn};

/// Alignment applied when callers ask for less.
pub const DEFAULT_MINIMUM_ALIGNMENT: u64 = 32;

/// Number of allocations the region log keeps.
pub const REGION_LOG_CAPACITY: usize = 64;

/// Hands the discovered free span to an allocator.
pub trait ArenaInit {
    /// Take over `size` bytes starting at `start`. Called once per boot.
    fn init_arena(&mut self, start: PhysicalAddress, size: u64);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("alignment {0:#x} is not a power of two")]
    InvalidAlignment(u64),
    #[error(
        "requested={requested:#x} (align={align:#x}), need={need:#x}, but free={free:#x}"
    )]
    OutOfMemory {
        requested: u64,
        align: u64,
        need: u64,
        free: u64,
    },
}

/// One logged allocation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Region {
    pub base: PhysicalAddress,
    pub size: u64,
}

#[derive(Debug)]
pub struct PhysArena {
    base: PhysicalAddress,
    top: PhysicalAddress,
    align_min: u64,
    regions: [Region; REGION_LOG_CAPACITY],
    nr_regions: usize,
    log_full_reported: bool,
}

impl Default for PhysArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaInit for PhysArena {
    fn init_arena(&mut self, start: PhysicalAddress, size: u64) {
        self.base = start;
        self.top = start.checked_add(size).unwrap_or(PhysicalAddress::new(u64::MAX));
        self.align_min = DEFAULT_MINIMUM_ALIGNMENT;
        self.nr_regions = 0;
        self.log_full_reported = false;
        info!("phys arena: {start}-{} ({size:#x} bytes)", self.top);
    }
}

impl PhysArena {
    /// An arena without storage; every allocation fails until [`ArenaInit::init_arena`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: PhysicalAddress::zero(),
            top: PhysicalAddress::zero(),
            align_min: DEFAULT_MINIMUM_ALIGNMENT,
            regions: [Region {
                base: PhysicalAddress::zero(),
                size: 0,
            }; REGION_LOG_CAPACITY],
            nr_regions: 0,
            log_full_reported: false,
        }
    }

    /// Raise or lower the alignment every allocation gets at least.
    ///
    /// # Errors
    /// [`ArenaError::InvalidAlignment`] unless `align` is a power of two.
    pub const fn set_minimum_alignment(&mut self, align: u64) -> Result<(), ArenaError> {
        if !align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment(align));
        }
        self.align_min = align;
        Ok(())
    }

    #[must_use]
    pub const fn minimum_alignment(&self) -> u64 {
        self.align_min
    }

    /// Bytes left between the free base and the top.
    #[must_use]
    pub const fn free(&self) -> u64 {
        self.top.as_u64().saturating_sub(self.base.as_u64())
    }

    /// Exclusive upper end of the arena.
    #[must_use]
    pub const fn top(&self) -> PhysicalAddress {
        self.top
    }

    /// Carve `size` bytes aligned to `max(align, minimum alignment)`.
    ///
    /// Padding needed for the alignment is consumed too.
    ///
    /// # Errors
    /// [`ArenaError::InvalidAlignment`] or [`ArenaError::OutOfMemory`]; the arena
    /// is unchanged in both cases.
    pub fn alloc_aligned(&mut self, size: u64, align: u64) -> Result<PhysicalAddress, ArenaError> {
        if !align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment(align));
        }
        let align = align.max(self.align_min);
        let free = self.free();
        let out_of_memory = |need| ArenaError::OutOfMemory {
            requested: size,
            align,
            need,
            free,
        };

        let addr = self.base.align_up(align).ok_or_else(|| out_of_memory(u64::MAX))?;
        let padding = addr.as_u64() - self.base.as_u64();
        let need = size.checked_add(padding).ok_or_else(|| out_of_memory(u64::MAX))?;
        if need > free {
            let err = out_of_memory(need);
            warn!("phys arena: {err}, top={}", self.top);
            return Err(err);
        }

        self.base += need;
        self.record(Region { base: addr, size });
        Ok(addr)
    }

    /// Carve `size` bytes at the minimum alignment.
    ///
    /// # Errors
    /// See [`PhysArena::alloc_aligned`].
    pub fn alloc(&mut self, size: u64) -> Result<PhysicalAddress, ArenaError> {
        self.alloc_aligned(size, self.align_min)
    }

    /// Like [`PhysArena::alloc_aligned`], then clear the storage.
    ///
    /// # Errors
    /// See [`PhysArena::alloc_aligned`].
    ///
    /// # Safety
    /// The arena must describe identity-mapped storage that nothing else uses.
    pub unsafe fn alloc_zeroed(
        &mut self,
        size: u64,
        align: u64,
    ) -> Result<PhysicalAddress, ArenaError> {
        let addr = self.alloc_aligned(size, align)?;
        #[allow(clippy::cast_possible_truncation)]
        // SAFETY: the range was just carved out of storage the caller vouches for.
        unsafe {
            core::ptr::write_bytes(addr.as_mut_ptr::<u8>(), 0, size as usize);
        }
        Ok(addr)
    }

    /// Hand out whatever is left and empty the arena.
    ///
    /// Returns the `(base, top)` pair, or `None` if nothing was left.
    pub fn take_unused(&mut self) -> Option<(PhysicalAddress, PhysicalAddress)> {
        if self.free() == 0 {
            return None;
        }
        let unused = (self.base, self.top);
        self.base = self.top;
        Some(unused)
    }

    /// Logged allocations, oldest first.
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions[..self.nr_regions].iter().copied()
    }

    /// Log the minimum alignment, every recorded region and the free rest.
    pub fn show(&self) {
        info!("phys arena minimum alignment: {:#x}", self.align_min);
        for region in self.regions() {
            info!(
                "{:016x}-{:016x} [USED]",
                region.base.as_u64(),
                (region.base.as_u64() + region.size).saturating_sub(1)
            );
        }
        info!(
            "{:016x}-{:016x} [FREE]",
            self.base.as_u64(),
            self.top.as_u64().saturating_sub(1)
        );
    }

    fn record(&mut self, region: Region) {
        if let Some(slot) = self.regions.get_mut(self.nr_regions) {
            *slot = region;
            self.nr_regions += 1;
        } else if !self.log_full_reported {
            warn!("phys arena: region log full, no longer logging allocations");
            self.log_full_reported = true;
        }
    }
}
