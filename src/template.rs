//! Shared page fragments. Both take everything they depend on as arguments.

use crate::options::SiteOptions;

/// Site header with navigation. `home` is the relative path to the site
/// root, as computed by [`crate::assemble::home_path`].
pub fn header(home: &str, options: &SiteOptions) -> String {
    format!(
        r#"
        <div class="container">
            <div class="header-nav">
                <div>
                    <a href="{home}index.html" class="logo">
                       Deep <span class="logo-accent">Hockey</span>
                    </a>
                </div>
                <div class="nav-menu">
                    <a href="{home}index.html" class="nav-link">Home</a>
                    <a href="{home}about.html" class="nav-link">About</a>
                    <a href="{channel}" class="nav-link">YouTube</a>
                </div>
            </div>
        </div>
    "#,
        channel = options.channel_url,
    )
}

pub fn footer(year: i32) -> String {
    format!(
        r#"
    <div class="container">
        <p class="footer-copyright">&copy; {year} Deep Hockey. All Rights Reserved.</p>
        <p class="footer-tagline">The future of hockey analysis is here.</p>
    </div>
"#
    )
}
