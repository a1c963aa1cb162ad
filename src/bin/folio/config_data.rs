use std::fs::{self, File};
use std::io;
use std::io::Write;
use std::path::Path;

const CONFIG_SAMPLE: &str = r#"# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
[paths]
content_dir = "content/blog"
template_dir = "template"
public_dir = "public"

[content]
extension = "md"
page_size = 10
list_limit_max = 100

[server]
address = "0.0.0.0"
port = 8001

# Remove the section to log to the console only
[log]
level = "Info"
log_to_console = true

# Without this section the dashboard shows placeholder GitHub numbers
#[github]
#username = "{{USER}}"
#timeout_ms = 3000
#token = "ghp_..."

[host]
probe_timeout_ms = 2000
cpu_sample_ms = 100
"#;

pub(crate) fn write_sample_cfg(file_path: &Path) -> io::Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(file_path)?;
    file.write_all(get_sample_cfg().as_bytes())
}

fn get_sample_cfg() -> String {
    CONFIG_SAMPLE.replace("{{USER}}", &whoami::username())
}
