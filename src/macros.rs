//! Macros to ease conditional code based on enabled features.

// Depending on the features not all macros are used.
#![allow(unused_macros)]

/// The `os-poll` feature is enabled and the target is one epoll supports.
macro_rules! cfg_epoll_selector {
    ($($item:item)*) => {
        $(
            #[cfg(all(
                unix,
                feature = "os-poll",
                any(target_os = "android", target_os = "illumos", target_os = "linux", target_os = "redox"),
            ))]
            $item
        )*
    };
}
