use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let proto_files = &["../../proto/users/v1/users.proto"];

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(out_dir.join("users_descriptor.bin"))
        .compile_protos(proto_files, &["../../proto"])?;

    println!("cargo:rerun-if-changed=../../proto/users/v1/users.proto");

    Ok(())
}
