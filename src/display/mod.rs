mod blit;
mod font;
mod platform;
mod raw;
mod surface;
#[cfg(windows)]
mod win32;

pub use blit::{draw_rotated, draw_rotated_sized};
#[allow(unused_imports)]
pub use font::{draw_text, draw_text_scaled, text_width, GLYPH_HEIGHT, GLYPH_WIDTH};
pub use platform::{
    BitmapHandle, BlendDescriptor, DeviceContext, HeadlessPlatform, Platform, WindowHandle,
};
#[allow(unused_imports)]
pub use raw::PixelView;
pub use surface::{Color, PixelFormat, Surface};
#[cfg(windows)]
pub use win32::Win32Platform;

use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 520;
pub const DEFAULT_HEIGHT: u32 = 520;

/// Everything that can go wrong between attach and present. Native errors
/// are converted at the platform boundary; none of them are fatal to the
/// render loop: a failed present just skips the frame.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("surface must be a 32-bit image with an alpha channel, got {0:?}")]
    UnsupportedFormat(PixelFormat),
    #[error("pixel depth {0} is not supported (only 8, 24 and 32 bpp images are)")]
    UnsupportedDepth(u32),
    #[error("cannot attach: {0}")]
    AttachFailed(&'static str),
    #[error("platform call {call} failed: {detail}")]
    Platform { call: &'static str, detail: String },
}

/// Attach-time settings for the layered window
#[derive(Debug, Clone, Copy)]
pub struct AttachOptions {
    /// Let mouse and keyboard input pass through the overlay
    pub input_transparent: bool,
    pub blend: BlendDescriptor,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            input_transparent: true,
            blend: BlendDescriptor::default(),
        }
    }
}

// ============================================================================
// Layered Display
// ============================================================================

/// Owns the offscreen surface and the persistent device contexts, and pushes
/// finished frames to the screen through the platform's layered-window
/// update. Lifecycle: attach, any number of presents, dispose (also run on
/// drop, idempotent).
pub struct LayeredDisplay<P: Platform> {
    platform: P,
    window: WindowHandle,
    surface: Surface,
    screen_dc: DeviceContext,
    memory_dc: DeviceContext,
    blend: BlendDescriptor,
    disposed: bool,
}

impl<P: Platform> LayeredDisplay<P> {
    /// Turn `window` into a layered surface and allocate the offscreen
    /// surface plus the screen/memory device-context pair kept for the
    /// lifetime of the display.
    ///
    /// Fails with [`DisplayError::AttachFailed`] when the window has no
    /// native handle yet.
    pub fn attach(
        platform: P,
        window: WindowHandle,
        width: u32,
        height: u32,
        options: AttachOptions,
    ) -> Result<Self, DisplayError> {
        if !window.is_valid() {
            return Err(DisplayError::AttachFailed("window has no native handle yet"));
        }
        platform.make_layered(window, options.input_transparent)?;
        let screen_dc = platform.screen_dc()?;
        let memory_dc = match platform.create_compatible_dc(screen_dc) {
            Ok(dc) => dc,
            Err(e) => {
                platform.release_screen_dc(screen_dc);
                return Err(e);
            },
        };
        log::debug!("attached {width}x{height} layered surface to window {:?}", window);
        Ok(Self {
            platform,
            window,
            surface: Surface::new(width, height),
            screen_dc,
            memory_dc,
            blend: options.blend,
            disposed: false,
        })
    }

    /// The drawing surface; valid between attach and dispose
    pub fn surface(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn surface_ref(&self) -> &Surface {
        &self.surface
    }

    /// Swap in a different backing surface, returning the old one
    pub fn replace_surface(&mut self, surface: Surface) -> Surface {
        std::mem::replace(&mut self.surface, surface)
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Whole-surface constant alpha for subsequent presents
    pub fn set_constant_alpha(&mut self, alpha: u8) {
        self.blend.source_constant_alpha = alpha;
    }

    /// Push the surface's current contents to the screen.
    ///
    /// Validates the pixel format first: only 32-bit-with-alpha surfaces are
    /// presentable, anything else fails with `UnsupportedFormat` before the
    /// platform is touched. The transient frame bitmap is bound into the
    /// memory DC through a scope guard, so the previously bound object is
    /// restored and the bitmap destroyed on every exit path, including a
    /// failing update. One bitmap in, one bitmap out, every frame.
    pub fn present(&mut self) -> Result<(), DisplayError> {
        if self.disposed {
            return Err(DisplayError::AttachFailed("display already disposed"));
        }
        let format = self.surface.format();
        if !format.has_alpha() {
            return Err(DisplayError::UnsupportedFormat(format));
        }

        let origin = self.platform.window_origin(self.window)?;
        let size = (self.surface.width(), self.surface.height());

        let _frame = FrameBitmap::bind(&self.platform, self.memory_dc, &self.surface)?;
        self.platform.update_layered_window(
            self.window,
            self.screen_dc,
            origin,
            size,
            self.memory_dc,
            (0, 0),
            &self.blend,
        )
    }

    /// Release the persistent device contexts. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.platform.release_screen_dc(self.screen_dc);
        self.platform.delete_dc(self.memory_dc);
        self.disposed = true;
        log::debug!("display disposed");
    }
}

impl<P: Platform> Drop for LayeredDisplay<P> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Scope guard for the frame bitmap's stay in the memory DC: selects it on
/// bind, restores the previous object and deletes the bitmap on drop.
struct FrameBitmap<'a, P: Platform> {
    platform: &'a P,
    dc: DeviceContext,
    bitmap: BitmapHandle,
    previous: BitmapHandle,
}

impl<'a, P: Platform> FrameBitmap<'a, P> {
    fn bind(platform: &'a P, dc: DeviceContext, surface: &Surface) -> Result<Self, DisplayError> {
        let bitmap = platform.create_frame_bitmap(surface)?;
        let previous = platform.select_bitmap(dc, bitmap);
        Ok(Self {
            platform,
            dc,
            bitmap,
            previous,
        })
    }
}

impl<P: Platform> Drop for FrameBitmap<'_, P> {
    fn drop(&mut self) {
        self.platform.select_bitmap(self.dc, self.previous);
        self.platform.delete_bitmap(self.bitmap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attach_headless() -> LayeredDisplay<HeadlessPlatform> {
        LayeredDisplay::attach(
            HeadlessPlatform::new(),
            WindowHandle(7),
            64,
            64,
            AttachOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_attach_requires_window_handle() {
        let err = LayeredDisplay::attach(
            HeadlessPlatform::new(),
            WindowHandle::NULL,
            64,
            64,
            AttachOptions::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, DisplayError::AttachFailed(_)));
    }

    #[test]
    fn test_present_pushes_one_update() {
        let mut display = attach_headless();
        display.surface().clear(Color::rgba(0, 0, 0, 0));
        display.present().unwrap();
        assert_eq!(display.platform().updates(), 1);
    }

    #[test]
    fn test_present_rejects_non_alpha_surface() {
        let mut display = attach_headless();
        display.replace_surface(Surface::with_format(64, 64, PixelFormat::Rgb24));
        let err = display.present().err().unwrap();
        assert!(matches!(err, DisplayError::UnsupportedFormat(PixelFormat::Rgb24)));
        // Failed validation never reaches the platform
        assert_eq!(display.platform().updates(), 0);
        assert_eq!(display.platform().bitmaps_created(), 0);
    }

    #[test]
    fn test_present_balances_bitmap_handles() {
        let mut display = attach_headless();
        for _ in 0..5 {
            display.present().unwrap();
        }
        assert_eq!(display.platform().bitmaps_created(), 5);
        assert_eq!(display.platform().outstanding_bitmaps(), 0);
        assert_eq!(
            display.platform().selected_bitmap(),
            HeadlessPlatform::stock_bitmap()
        );
    }

    #[test]
    fn test_failed_update_still_releases_bitmap() {
        let mut display = attach_headless();
        display.platform().fail_updates(true);
        let err = display.present().err().unwrap();
        assert!(matches!(err, DisplayError::Platform { .. }));
        // Exactly one bitmap was created and destroyed despite the failure
        assert_eq!(display.platform().bitmaps_created(), 1);
        assert_eq!(display.platform().outstanding_bitmaps(), 0);
        assert_eq!(
            display.platform().selected_bitmap(),
            HeadlessPlatform::stock_bitmap()
        );
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut display = attach_headless();
        assert_eq!(display.platform().outstanding_dcs(), 2);
        display.dispose();
        assert_eq!(display.platform().outstanding_dcs(), 0);
        display.dispose();
        assert_eq!(display.platform().outstanding_dcs(), 0);
        assert!(display.present().is_err());
    }

    #[test]
    fn test_present_uses_current_window_origin() {
        let mut display = attach_headless();
        display.platform().set_origin(120, -15);
        display.present().unwrap();
        // The headless backend records nothing per call, but the origin is
        // queried per present; a panic or stale cache would surface here.
        display.platform().set_origin(0, 0);
        display.present().unwrap();
        assert_eq!(display.platform().updates(), 2);
    }
}
