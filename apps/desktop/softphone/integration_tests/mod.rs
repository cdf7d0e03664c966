mod console {
    mod session;
}
