//! Minimal host window for the overlay: a borderless topmost popup plus its
//! message pump. The display core only ever sees the native handle; window
//! lifecycle stays out here.

use std::sync::atomic::{AtomicBool, Ordering};

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DispatchMessageW, IsIconic, PeekMessageW, PostQuitMessage,
    RegisterClassW, ShowWindow, TranslateMessage, MSG, PM_REMOVE, SW_SHOWNOACTIVATE, WM_DESTROY,
    WM_QUIT, WNDCLASSW, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

use crate::display::{DisplayError, WindowHandle};

static CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);

unsafe extern "system" fn wndproc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if msg == WM_DESTROY {
        PostQuitMessage(0);
        return LRESULT(0);
    }
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

pub struct HostWindow {
    hwnd: HWND,
}

impl HostWindow {
    pub fn create(x: i32, y: i32, width: u32, height: u32) -> Result<Self, DisplayError> {
        let class_name = w!("glasspane-overlay");
        unsafe {
            let instance = GetModuleHandleW(None).map_err(|e| DisplayError::Platform {
                call: "GetModuleHandleW",
                detail: e.message(),
            })?;

            if !CLASS_REGISTERED.swap(true, Ordering::SeqCst) {
                let class = WNDCLASSW {
                    lpfnWndProc: Some(wndproc),
                    hInstance: instance.into(),
                    lpszClassName: class_name,
                    ..Default::default()
                };
                if RegisterClassW(&class) == 0 {
                    return Err(DisplayError::Platform {
                        call: "RegisterClassW",
                        detail: windows::core::Error::from_win32().message(),
                    });
                }
            }

            let hwnd = CreateWindowExW(
                WS_EX_TOOLWINDOW | WS_EX_TOPMOST,
                class_name,
                PCWSTR::null(),
                WS_POPUP,
                x,
                y,
                width as i32,
                height as i32,
                None,
                None,
                Some(instance.into()),
                None,
            )
            .map_err(|e| DisplayError::Platform {
                call: "CreateWindowExW",
                detail: e.message(),
            })?;

            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);

            Ok(Self { hwnd })
        }
    }

    pub fn handle(&self) -> WindowHandle {
        WindowHandle(self.hwnd.0 as isize)
    }

    /// Drain pending messages. Returns false once the window is gone.
    pub fn pump(&self) -> bool {
        let mut msg = MSG::default();
        unsafe {
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    return false;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        true
    }

    /// True while the window is minimized; rendering pauses then
    pub fn minimized(&self) -> bool {
        unsafe { IsIconic(self.hwnd).as_bool() }
    }
}
