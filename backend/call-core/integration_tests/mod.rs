mod error {
    mod spawn;
    mod session;
}

#[cfg(unix)]
mod session {
    mod runtime;
}

#[cfg(unix)]
mod transport {
    mod process;
}
