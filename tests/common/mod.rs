use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::Path;

pub const ORIGINAL_COMMAND: &str = "cd /app && exec dotnet ./app.dll --server.urls http://0.0.0.0:5000";

/// Gzip-compressed tar with the layout of an agent package.
pub fn agent_package() -> Vec<u8> {
    let mut tar = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in [
        ("SL.DotNet", "#!/bin/sh\n"),
        ("libSL.DotNet.ProfilerLib.Linux.so", "profiler"),
        ("plugins/readme.txt", "plugins"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        tar.append_data(&mut header, path, content.as_bytes())
            .unwrap();
    }
    tar.into_inner().unwrap().finish().unwrap()
}

/// Service bindings document with a Sealights binding carrying `credentials` (a JSON object).
pub fn vcap_services(credentials: &str) -> String {
    format!(
        r#"{{
  "user-provided": [
    {{"name": "postgres", "credentials": {{"uri": "postgres://db"}}}},
    {{"name": "sealights-dotnet", "credentials": {credentials}}}
  ]
}}"#
    )
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Web process command of the Procfile at `path`.
pub fn web_command(path: &Path) -> String {
    let document: serde_yaml::Value = serde_yaml::from_str(&read(path)).unwrap();
    document["web"].as_str().unwrap().to_string()
}
