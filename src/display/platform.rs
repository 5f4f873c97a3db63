//! Platform boundary for the layered-window present protocol.
//!
//! The compositor talks to the OS graphics subsystem only through the
//! [`Platform`] trait: window styling, device contexts, the transient frame
//! bitmap and the layered-window update itself. The Win32 GDI backend lives
//! in `win32.rs`; [`HeadlessPlatform`] is a no-op backend that tracks handle
//! lifetimes, used for headless runs and by the test suite to prove the
//! present path never leaks a handle.

use std::cell::Cell;

use super::surface::Surface;
use super::DisplayError;

// ============================================================================
// Handles
// ============================================================================

/// Native window handle. Zero means "no window yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: Self = Self(0);

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Opaque device-context handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceContext(pub isize);

/// Opaque bitmap handle. Frame bitmaps live strictly inside one present call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitmapHandle(pub isize);

impl BitmapHandle {
    pub const NULL: Self = Self(0);
}

// ============================================================================
// Blend Descriptor
// ============================================================================

/// Per-present blend parameters. The blend operation is always source-over;
/// that is the only operation the layered-window update defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendDescriptor {
    /// Constant alpha applied to the whole surface on top of per-pixel alpha
    pub source_constant_alpha: u8,
    /// The source carries meaningful premultiplied per-pixel alpha
    pub per_pixel_alpha: bool,
}

impl Default for BlendDescriptor {
    fn default() -> Self {
        Self {
            source_constant_alpha: 255,
            per_pixel_alpha: true,
        }
    }
}

// ============================================================================
// Platform Trait
// ============================================================================

/// The operations the compositor needs from the OS. Every fallible call maps
/// native failure onto [`DisplayError`] at this boundary; raw platform error
/// codes never travel further up.
pub trait Platform {
    /// Mark the window as a layered surface, optionally transparent to input
    fn make_layered(&self, window: WindowHandle, input_transparent: bool)
        -> Result<(), DisplayError>;

    /// Current top-left of the window in screen coordinates
    fn window_origin(&self, window: WindowHandle) -> Result<(i32, i32), DisplayError>;

    /// Acquire the screen device context (released with `release_screen_dc`)
    fn screen_dc(&self) -> Result<DeviceContext, DisplayError>;

    /// Create a memory device context compatible with the screen
    fn create_compatible_dc(&self, screen: DeviceContext) -> Result<DeviceContext, DisplayError>;

    /// Create the transient frame bitmap carrying the surface's premultiplied
    /// pixels. The caller owns the handle and must delete it within the same
    /// present call.
    fn create_frame_bitmap(&self, surface: &Surface) -> Result<BitmapHandle, DisplayError>;

    /// Bind a bitmap into a device context, returning the previously bound
    /// object so it can be restored
    fn select_bitmap(&self, dc: DeviceContext, bitmap: BitmapHandle) -> BitmapHandle;

    /// Push the memory device context's contents to the screen as the
    /// window's new alpha-blended content
    fn update_layered_window(
        &self,
        window: WindowHandle,
        screen: DeviceContext,
        origin: (i32, i32),
        size: (u32, u32),
        source: DeviceContext,
        source_origin: (i32, i32),
        blend: &BlendDescriptor,
    ) -> Result<(), DisplayError>;

    fn delete_bitmap(&self, bitmap: BitmapHandle);

    fn release_screen_dc(&self, dc: DeviceContext);

    fn delete_dc(&self, dc: DeviceContext);
}

// ============================================================================
// Headless Platform
// ============================================================================

/// Backend with no display attached. Hands out synthetic handles and counts
/// acquisitions against releases, which makes it double as the leak detector
/// for the present protocol.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    next_handle: Cell<isize>,
    bitmaps_created: Cell<u32>,
    bitmaps_deleted: Cell<u32>,
    dcs_created: Cell<u32>,
    dcs_deleted: Cell<u32>,
    updates: Cell<u32>,
    selected: Cell<BitmapHandle>,
    fail_updates: Cell<bool>,
    origin: Cell<(i32, i32)>,
}

/// The stock object a fresh memory DC starts out holding
const STOCK_BITMAP: BitmapHandle = BitmapHandle(-1);

impl HeadlessPlatform {
    pub fn new() -> Self {
        let p = Self::default();
        p.next_handle.set(100);
        p.selected.set(STOCK_BITMAP);
        p
    }

    fn fresh_handle(&self) -> isize {
        let h = self.next_handle.get();
        self.next_handle.set(h + 1);
        h
    }

    /// Make every subsequent layered-window update fail
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.set(fail);
    }

    pub fn set_origin(&self, x: i32, y: i32) {
        self.origin.set((x, y));
    }

    pub fn updates(&self) -> u32 {
        self.updates.get()
    }

    pub fn bitmaps_created(&self) -> u32 {
        self.bitmaps_created.get()
    }

    /// Frame bitmaps currently alive; zero between presents when the
    /// protocol is leak-free
    pub fn outstanding_bitmaps(&self) -> u32 {
        self.bitmaps_created.get() - self.bitmaps_deleted.get()
    }

    /// Device contexts currently alive
    pub fn outstanding_dcs(&self) -> u32 {
        self.dcs_created.get() - self.dcs_deleted.get()
    }

    /// Object currently bound to the memory DC
    pub fn selected_bitmap(&self) -> BitmapHandle {
        self.selected.get()
    }

    pub fn stock_bitmap() -> BitmapHandle {
        STOCK_BITMAP
    }
}

impl Platform for HeadlessPlatform {
    fn make_layered(
        &self,
        window: WindowHandle,
        _input_transparent: bool,
    ) -> Result<(), DisplayError> {
        if !window.is_valid() {
            return Err(DisplayError::Platform {
                call: "make_layered",
                detail: "null window handle".into(),
            });
        }
        Ok(())
    }

    fn window_origin(&self, _window: WindowHandle) -> Result<(i32, i32), DisplayError> {
        Ok(self.origin.get())
    }

    fn screen_dc(&self) -> Result<DeviceContext, DisplayError> {
        self.dcs_created.set(self.dcs_created.get() + 1);
        Ok(DeviceContext(self.fresh_handle()))
    }

    fn create_compatible_dc(&self, _screen: DeviceContext) -> Result<DeviceContext, DisplayError> {
        self.dcs_created.set(self.dcs_created.get() + 1);
        Ok(DeviceContext(self.fresh_handle()))
    }

    fn create_frame_bitmap(&self, _surface: &Surface) -> Result<BitmapHandle, DisplayError> {
        self.bitmaps_created.set(self.bitmaps_created.get() + 1);
        Ok(BitmapHandle(self.fresh_handle()))
    }

    fn select_bitmap(&self, _dc: DeviceContext, bitmap: BitmapHandle) -> BitmapHandle {
        self.selected.replace(bitmap)
    }

    fn update_layered_window(
        &self,
        _window: WindowHandle,
        _screen: DeviceContext,
        _origin: (i32, i32),
        _size: (u32, u32),
        _source: DeviceContext,
        _source_origin: (i32, i32),
        _blend: &BlendDescriptor,
    ) -> Result<(), DisplayError> {
        if self.fail_updates.get() {
            return Err(DisplayError::Platform {
                call: "update_layered_window",
                detail: "simulated failure".into(),
            });
        }
        self.updates.set(self.updates.get() + 1);
        Ok(())
    }

    fn delete_bitmap(&self, _bitmap: BitmapHandle) {
        self.bitmaps_deleted.set(self.bitmaps_deleted.get() + 1);
    }

    fn release_screen_dc(&self, _dc: DeviceContext) {
        self.dcs_deleted.set(self.dcs_deleted.get() + 1);
    }

    fn delete_dc(&self, _dc: DeviceContext) {
        self.dcs_deleted.set(self.dcs_deleted.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_counts_handles() {
        let p = HeadlessPlatform::new();
        let dc = p.screen_dc().unwrap();
        let mem = p.create_compatible_dc(dc).unwrap();
        assert_eq!(p.outstanding_dcs(), 2);
        p.release_screen_dc(dc);
        p.delete_dc(mem);
        assert_eq!(p.outstanding_dcs(), 0);
    }

    #[test]
    fn test_headless_rejects_null_window() {
        let p = HeadlessPlatform::new();
        assert!(p.make_layered(WindowHandle::NULL, false).is_err());
        assert!(p.make_layered(WindowHandle(7), true).is_ok());
    }

    #[test]
    fn test_select_returns_previous() {
        let p = HeadlessPlatform::new();
        let dc = p.create_compatible_dc(DeviceContext(1)).unwrap();
        let bmp = BitmapHandle(42);
        let old = p.select_bitmap(dc, bmp);
        assert_eq!(old, HeadlessPlatform::stock_bitmap());
        assert_eq!(p.select_bitmap(dc, old), bmp);
    }
}
