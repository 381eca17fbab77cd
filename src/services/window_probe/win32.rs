use crate::error::Result;
use crate::tracker_error;
use crate::events::{ForegroundWindow, WindowHandle};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowTextW, GetWindowThreadProcessId,
};

use super::r#trait::WindowProbe;

pub struct Win32Probe;

impl Win32Probe {
    pub fn new() -> Self {
        Self
    }
}

impl WindowProbe for Win32Probe {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn test(&self) -> Result<()> {
        Ok(())
    }

    fn foreground_window(&self) -> Result<Option<ForegroundWindow>> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                return Ok(None);
            }

            let mut pid = 0u32;
            let thread_id = GetWindowThreadProcessId(hwnd, Some(&mut pid));
            let pid = owner_pid(thread_id, pid)?;

            let mut title_buf = [0u16; 512];
            let len = GetWindowTextW(hwnd, &mut title_buf);
            let title = String::from_utf16_lossy(&title_buf[..len.max(0) as usize]);

            Ok(Some(ForegroundWindow::new(
                WindowHandle::new(format!("{:#x}", hwnd.0 as usize)),
                pid,
                title,
            )))
        }
    }
}

/// Окно без владельца-процесса считается отказом пробы
fn owner_pid(thread_id: u32, pid: u32) -> Result<u32> {
    if thread_id == 0 || pid == 0 {
        return Err(tracker_error!(probe, "GetWindowThreadProcessId не вернул pid окна"));
    }
    Ok(pid)
}
