//! Static flag and dependency tables keyed by [`PlatformTag`].
//!
//! These are the hand-tuned alternatives to probing. `Dynamic` has no static
//! flags because its list comes from the synthesizer at install time.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::PlatformTag;
use crate::i18n::Translator;

const RPI5_CFLAGS_O3: &str = "-march=armv8.2-a+fp16+rcpc+dotprod -mtune=cortex-a76 -O3";
const RPI5_CFLAGS_O2: &str = "-march=armv8.2-a+fp16+rcpc+dotprod -mtune=cortex-a76 -O2";
const RPI4_CFLAGS: &str = "-march=armv8-a+crc -mtune=cortex-a72 -O2";

const BASE_DEPENDENCIES: [&str; 4] = ["git", "build-essential", "cmake", "pkg-config"];
const TERMUX_DEPENDENCIES: [&str; 5] = ["git", "clang", "cmake", "make", "pkg-config"];

fn owned(flags: &[&str]) -> Vec<String> {
    flags.iter().map(ToString::to_string).collect()
}

fn arm_flags(cflags: &str, extra_head: &[&str], extra_tail: &[&str]) -> Vec<String> {
    let mut flags = owned(extra_head);
    flags.push("-DGGML_BLAS=ON".to_string());
    flags.push("-DGGML_OPENMP=ON".to_string());
    flags.push(format!("-DCMAKE_C_FLAGS={cflags}"));
    flags.push(format!("-DCMAKE_CXX_FLAGS={cflags}"));
    flags.push("-DGGML_NATIVE=OFF".to_string());
    flags.extend(owned(extra_tail));
    flags
}

/// CMake flags for a platform tag.
pub fn static_flags(tag: PlatformTag) -> Vec<String> {
    match tag {
        PlatformTag::Dynamic => Vec::new(),
        PlatformTag::Rpi5_8gb | PlatformTag::Rpi5_16gb => arm_flags(
            RPI5_CFLAGS_O3,
            &["-DGGML_RPC=ON"],
            &["-DGGML_LTO=ON", "-DCMAKE_BUILD_TYPE=Release", "-DGGML_CUDA=OFF"],
        ),
        PlatformTag::Rpi5_4gb => arm_flags(RPI5_CFLAGS_O2, &[], &["-DCMAKE_BUILD_TYPE=Release"]),
        PlatformTag::Rpi4 => arm_flags(RPI4_CFLAGS, &[], &["-DCMAKE_BUILD_TYPE=Release"]),
        PlatformTag::RpiOther => arm_flags("-O2", &[], &["-DCMAKE_BUILD_TYPE=Release"]),
        PlatformTag::Termux => owned(&[
            "-DGGML_BLAS=OFF",
            "-DGGML_OPENMP=ON",
            "-DCMAKE_C_FLAGS=-O2",
            "-DCMAKE_CXX_FLAGS=-O2",
            "-DGGML_NATIVE=OFF",
            "-DCMAKE_BUILD_TYPE=Release",
            "-DGGML_CUDA=OFF",
            "-DGGML_VULKAN=OFF",
        ]),
        PlatformTag::X86Linux => owned(&[
            "-DGGML_AVX=ON",
            "-DGGML_AVX2=ON",
            "-DGGML_FMA=ON",
            "-DGGML_BLAS=ON",
            "-DGGML_OPENMP=ON",
            "-DGGML_NATIVE=ON",
            "-DGGML_LTO=ON",
            "-DCMAKE_BUILD_TYPE=Release",
            "-DGGML_CUDA=OFF",
        ]),
        PlatformTag::X86LinuxOld => owned(&[
            "-DGGML_AVX=ON",
            "-DGGML_AVX2=OFF",
            "-DGGML_FMA=OFF",
            "-DGGML_BMI2=OFF",
            "-DGGML_F16C=OFF",
            "-DGGML_BLAS=OFF",
            "-DGGML_OPENMP=ON",
            "-DGGML_NATIVE=OFF",
            "-DGGML_LTO=OFF",
            "-DCMAKE_BUILD_TYPE=Release",
            "-DGGML_CUDA=OFF",
            "-DLLAMA_CURL=OFF",
        ]),
        PlatformTag::X86LinuxMinimal => owned(&[
            "-DGGML_AVX=OFF",
            "-DGGML_AVX2=OFF",
            "-DGGML_FMA=OFF",
            "-DGGML_BMI2=OFF",
            "-DGGML_F16C=OFF",
            "-DGGML_BLAS=OFF",
            "-DGGML_OPENMP=OFF",
            "-DGGML_NATIVE=OFF",
            "-DGGML_LTO=OFF",
            "-DCMAKE_BUILD_TYPE=Release",
            "-DGGML_CUDA=OFF",
            "-DLLAMA_CURL=OFF",
        ]),
        PlatformTag::NoOptimization | PlatformTag::Unknown => owned(&[
            "-DCMAKE_BUILD_TYPE=Release",
            "-DGGML_CUDA=OFF",
            "-DGGML_BLAS=OFF",
            "-DGGML_OPENMP=OFF",
            "-DGGML_NATIVE=OFF",
            "-DGGML_AVX=OFF",
            "-DGGML_AVX2=OFF",
            "-DGGML_FMA=OFF",
            "-DGGML_BMI2=OFF",
            "-DGGML_F16C=OFF",
            "-DGGML_LTO=OFF",
            "-DLLAMA_CURL=OFF",
        ]),
    }
}

/// System packages required to build for a platform tag.
pub fn dependencies(tag: PlatformTag) -> Vec<String> {
    let mut deps = owned(&BASE_DEPENDENCIES);
    match tag {
        PlatformTag::Termux => return owned(&TERMUX_DEPENDENCIES),
        PlatformTag::Rpi5_8gb
        | PlatformTag::Rpi5_16gb
        | PlatformTag::Rpi5_4gb
        | PlatformTag::Rpi4
        | PlatformTag::RpiOther
        | PlatformTag::X86Linux => {
            deps.extend(owned(&["libopenblas-dev", "libomp-dev"]));
        }
        PlatformTag::X86LinuxOld => deps.push("libomp-dev".to_string()),
        PlatformTag::Dynamic
        | PlatformTag::X86LinuxMinimal
        | PlatformTag::NoOptimization
        | PlatformTag::Unknown => {}
    }
    deps
}

/// Localized one-line description of a platform tag.
pub fn description(tag: PlatformTag, translator: &Translator) -> String {
    translator.t(&format!("hardware_{}", tag.as_str()))
}

/// Errors reading a user-supplied flags file.
#[derive(Debug, Error)]
pub enum CustomConfigError {
    #[error("configuration file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration file {} contains no flags", .0.display())]
    Empty(PathBuf),
}

/// One flag per line, skipping blank lines and `#` comments.
pub fn parse_custom_flags(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Read and parse a flags file.
pub fn load_custom_flags(path: &Path) -> Result<Vec<String>, CustomConfigError> {
    if !path.exists() {
        return Err(CustomConfigError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| CustomConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let flags = parse_custom_flags(&text);
    if flags.is_empty() {
        return Err(CustomConfigError::Empty(path.to_path_buf()));
    }
    tracing::debug!(path = %path.display(), count = flags.len(), "Loaded custom flags");
    Ok(flags)
}

/// Commented template for `create-config`, listing the tag's static flags.
pub fn render_config_template(tag: PlatformTag, path_hint: &str, translator: &Translator) -> String {
    let mut out = translator.t_with(
        "config_template_header",
        &[("hardware_type", tag.as_str()), ("path", path_hint)],
    );
    out.push('\n');
    for flag in static_flags(tag) {
        out.push_str(&flag);
        out.push('\n');
    }
    out
}
