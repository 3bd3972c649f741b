#![allow(unsafe_code, reason = "Win32 foreground and version-info calls are FFI")]

use super::{process_details, ForegroundProbe, ForegroundProcess};
use std::ffi::c_void;
use std::path::Path;
use std::ptr;
use windows::core::PCWSTR;
use windows::Win32::Storage::FileSystem::{
    GetFileVersionInfoSizeW, GetFileVersionInfoW, VerQueryValueW,
};
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId};

/// Foreground process lookup via `GetForegroundWindow`.
///
/// The description comes from the executable's `FileDescription` version
/// resource, which is what Explorer shows as the application name.
#[derive(Debug, Default)]
pub struct WindowsProbe;

impl WindowsProbe {
    pub fn new() -> Self {
        Self
    }
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn query_value(block: &[u8], sub_block: &str) -> Option<(*const c_void, usize)> {
    let sub_block = wide(sub_block);
    let mut value: *mut c_void = ptr::null_mut();
    let mut len = 0u32;
    // SAFETY: `block` holds a complete version resource returned by
    // GetFileVersionInfoW and outlives the returned pointer's use.
    let found = unsafe {
        VerQueryValueW(
            block.as_ptr().cast(),
            PCWSTR(sub_block.as_ptr()),
            ptr::addr_of_mut!(value),
            ptr::addr_of_mut!(len),
        )
    };
    if !found.as_bool() || value.is_null() || len == 0 {
        return None;
    }
    Some((value.cast_const(), usize::try_from(len).ok()?))
}

/// `FileDescription` of the executable's first translation.
fn file_description(exe: &Path) -> Option<String> {
    let path = wide(&exe.to_string_lossy());

    // SAFETY: `path` is NUL-terminated and `block` is sized from the call
    // that precedes it.
    let block = unsafe {
        let size = GetFileVersionInfoSizeW(PCWSTR(path.as_ptr()), None);
        if size == 0 {
            return None;
        }
        let mut block = vec![0u8; usize::try_from(size).ok()?];
        GetFileVersionInfoW(PCWSTR(path.as_ptr()), None, size, block.as_mut_ptr().cast()).ok()?;
        block
    };

    let (translation, _) = query_value(&block, "\\VarFileInfo\\Translation")?;
    // SAFETY: a Translation entry is at least one (language, codepage) pair.
    let (language, codepage) = unsafe {
        let pair = translation.cast::<u16>();
        (pair.read_unaligned(), pair.add(1).read_unaligned())
    };

    let key = format!("\\StringFileInfo\\{language:04x}{codepage:04x}\\FileDescription");
    let (text, len) = query_value(&block, &key)?;
    // SAFETY: VerQueryValueW reports the length in UTF-16 units for string values.
    let units = unsafe { std::slice::from_raw_parts(text.cast::<u16>(), len) };
    let description = String::from_utf16_lossy(units);
    Some(description.trim_end_matches('\0').to_string())
}

impl ForegroundProbe for WindowsProbe {
    fn foreground_process(&self) -> Option<ForegroundProcess> {
        let mut pid = 0u32;
        // SAFETY: pid is a valid out-pointer for the duration of the call.
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.is_invalid() {
                return None;
            }
            GetWindowThreadProcessId(hwnd, Some(ptr::addr_of_mut!(pid)));
        }
        if pid == 0 {
            return None;
        }

        let (executable, process_name) = process_details(pid);
        let description = executable.as_deref().and_then(file_description);

        Some(ForegroundProcess {
            pid,
            description,
            executable,
            process_name,
        })
    }
}
