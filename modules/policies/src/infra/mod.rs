pub mod upstream;
pub mod url_template;

pub use upstream::HttpPolicyUpstream;
