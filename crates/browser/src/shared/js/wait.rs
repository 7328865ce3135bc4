pub const CHECK_LOADING: &str = r#"
() => ({
    readyState: document.readyState,
    loading: document.readyState !== 'complete',
    activeRequests: performance.getEntriesByType('resource').filter(r => !r.responseEnd).length
})
"#;
