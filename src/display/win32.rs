//! GDI backend: the real layered-window path.
//!
//! Maps the platform trait onto user32/gdi32. Frame pixels travel as a
//! top-down 32-bit DIB section filled with the surface's premultiplied
//! bytes, which is what `UpdateLayeredWindow` expects with `ULW_ALPHA`.

use std::ffi::c_void;

use windows::Win32::Foundation::{COLORREF, HWND, POINT, RECT, SIZE};
use windows::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetDC, ReleaseDC, SelectObject,
    AC_SRC_ALPHA, AC_SRC_OVER, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, BLENDFUNCTION,
    DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetWindowLongW, GetWindowRect, SetWindowLongW, UpdateLayeredWindow, GWL_EXSTYLE, ULW_ALPHA,
    WS_EX_LAYERED, WS_EX_TRANSPARENT,
};

use super::platform::{BitmapHandle, BlendDescriptor, DeviceContext, Platform, WindowHandle};
use super::surface::Surface;
use super::DisplayError;

/// Production backend talking to the Win32 graphics subsystem
#[derive(Debug, Default)]
pub struct Win32Platform;

impl Win32Platform {
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

#[inline]
fn hdc(dc: DeviceContext) -> HDC {
    HDC(dc.0 as *mut c_void)
}

#[inline]
fn hbitmap(bitmap: BitmapHandle) -> HBITMAP {
    HBITMAP(bitmap.0 as *mut c_void)
}

/// Last-error detail for the platform error variant
fn win_detail() -> String {
    windows::core::Error::from_win32().message()
}

impl Platform for Win32Platform {
    fn make_layered(
        &self,
        window: WindowHandle,
        input_transparent: bool,
    ) -> Result<(), DisplayError> {
        unsafe {
            let mut style = GetWindowLongW(hwnd(window), GWL_EXSTYLE);
            style |= WS_EX_LAYERED.0 as i32;
            if input_transparent {
                style |= WS_EX_TRANSPARENT.0 as i32;
            }
            if SetWindowLongW(hwnd(window), GWL_EXSTYLE, style) == 0 {
                return Err(DisplayError::Platform {
                    call: "SetWindowLongW",
                    detail: win_detail(),
                });
            }
        }
        Ok(())
    }

    fn window_origin(&self, window: WindowHandle) -> Result<(i32, i32), DisplayError> {
        let mut rect = RECT::default();
        unsafe {
            GetWindowRect(hwnd(window), &mut rect).map_err(|e| DisplayError::Platform {
                call: "GetWindowRect",
                detail: e.message(),
            })?;
        }
        Ok((rect.left, rect.top))
    }

    fn screen_dc(&self) -> Result<DeviceContext, DisplayError> {
        let dc = unsafe { GetDC(None) };
        if dc.is_invalid() {
            return Err(DisplayError::Platform {
                call: "GetDC",
                detail: win_detail(),
            });
        }
        Ok(DeviceContext(dc.0 as isize))
    }

    fn create_compatible_dc(&self, screen: DeviceContext) -> Result<DeviceContext, DisplayError> {
        let dc = unsafe { CreateCompatibleDC(Some(hdc(screen))) };
        if dc.is_invalid() {
            return Err(DisplayError::Platform {
                call: "CreateCompatibleDC",
                detail: win_detail(),
            });
        }
        Ok(DeviceContext(dc.0 as isize))
    }

    fn create_frame_bitmap(&self, surface: &Surface) -> Result<BitmapHandle, DisplayError> {
        let info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: surface.width() as i32,
                // Negative height: top-down rows, same order the surface uses
                biHeight: -(surface.height() as i32),
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut bits: *mut c_void = std::ptr::null_mut();
        let bitmap = unsafe {
            CreateDIBSection(None, &info, DIB_RGB_COLORS, &mut bits, None, 0).map_err(|e| {
                DisplayError::Platform {
                    call: "CreateDIBSection",
                    detail: e.message(),
                }
            })?
        };

        // Full-surface copy into the section; 32 bpp rows are already
        // DWORD-aligned, so the strides agree
        let pixels = surface.premultiplied();
        unsafe {
            std::ptr::copy_nonoverlapping(pixels.as_ptr(), bits as *mut u8, pixels.len());
        }

        Ok(BitmapHandle(bitmap.0 as isize))
    }

    fn select_bitmap(&self, dc: DeviceContext, bitmap: BitmapHandle) -> BitmapHandle {
        let previous = unsafe { SelectObject(hdc(dc), HGDIOBJ(hbitmap(bitmap).0)) };
        BitmapHandle(previous.0 as isize)
    }

    fn update_layered_window(
        &self,
        window: WindowHandle,
        screen: DeviceContext,
        origin: (i32, i32),
        size: (u32, u32),
        source: DeviceContext,
        source_origin: (i32, i32),
        blend: &BlendDescriptor,
    ) -> Result<(), DisplayError> {
        let dst = POINT {
            x: origin.0,
            y: origin.1,
        };
        let dim = SIZE {
            cx: size.0 as i32,
            cy: size.1 as i32,
        };
        let src = POINT {
            x: source_origin.0,
            y: source_origin.1,
        };
        let blend_fn = BLENDFUNCTION {
            BlendOp: AC_SRC_OVER as u8,
            BlendFlags: 0,
            SourceConstantAlpha: blend.source_constant_alpha,
            AlphaFormat: if blend.per_pixel_alpha {
                AC_SRC_ALPHA as u8
            } else {
                0
            },
        };

        unsafe {
            UpdateLayeredWindow(
                hwnd(window),
                Some(hdc(screen)),
                Some(&dst),
                Some(&dim),
                Some(hdc(source)),
                Some(&src),
                COLORREF(0),
                Some(&blend_fn),
                ULW_ALPHA,
            )
            .map_err(|e| DisplayError::Platform {
                call: "UpdateLayeredWindow",
                detail: e.message(),
            })
        }
    }

    fn delete_bitmap(&self, bitmap: BitmapHandle) {
        unsafe {
            let _ = DeleteObject(HGDIOBJ(hbitmap(bitmap).0));
        }
    }

    fn release_screen_dc(&self, dc: DeviceContext) {
        unsafe {
            ReleaseDC(None, hdc(dc));
        }
    }

    fn delete_dc(&self, dc: DeviceContext) {
        unsafe {
            let _ = DeleteDC(hdc(dc));
        }
    }
}
