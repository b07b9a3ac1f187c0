//! Disposable source tree for one probe build.
//!
//! The CMake descriptor is generated from the candidate flags: each enabled
//! instruction-set toggle adds the matching `-m` option, each enabled library
//! toggle adds a `find_package` plus link, and LTO requires IPO support. The
//! C++ unit exercises whatever the compiler enabled, so a CPU that lacks an
//! instruction fails at run time instead of passing silently.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ggforge_core::{FeatureToggle, split_definition};
use tempfile::TempDir;

pub(crate) const TARGET_NAME: &str = "ggforge_probe";

const PROBE_SOURCE: &str = r#"#include <cstdio>

#if defined(__AVX__) || defined(__AVX2__) || defined(__FMA__) || defined(__F16C__) || defined(__BMI2__)
#include <immintrin.h>
#endif
#ifdef PROBE_OPENMP
#include <omp.h>
#endif
#ifdef PROBE_CURL
#include <curl/curl.h>
#endif
#ifdef PROBE_BLAS
extern "C" double cblas_ddot(const int n, const double *x, const int incx,
                             const double *y, const int incy);
#endif

int main() {
    volatile float seed = 1.0f;
    float acc = seed;

#ifdef __AVX__
    __m256 a = _mm256_set1_ps(seed);
    __m256 b = _mm256_set1_ps(2.0f);
    float lanes[8];
    _mm256_storeu_ps(lanes, _mm256_add_ps(a, b));
    acc += lanes[0];
#endif
#ifdef __AVX2__
    __m256i ia = _mm256_set1_epi32(3);
    acc += static_cast<float>(_mm256_extract_epi32(_mm256_add_epi32(ia, ia), 0));
#endif
#ifdef __FMA__
    __m256 fa = _mm256_set1_ps(seed);
    float flanes[8];
    _mm256_storeu_ps(flanes, _mm256_fmadd_ps(fa, fa, fa));
    acc += flanes[0];
#endif
#ifdef __F16C__
    __m128i half = _mm_cvtps_ph(_mm_set1_ps(seed), 0);
    acc += _mm_cvtss_f32(_mm_cvtph_ps(half));
#endif
#ifdef __BMI2__
    acc += static_cast<float>(_pdep_u32(static_cast<unsigned>(seed), 0xF0F0u) != 0u);
#endif
#ifdef PROBE_OPENMP
    acc += static_cast<float>(omp_get_max_threads() > 0);
#endif
#ifdef PROBE_CURL
    acc += curl_version_info(CURLVERSION_NOW) != nullptr ? 1.0f : 0.0f;
#endif
#ifdef PROBE_BLAS
    double x[2] = {1.0, 2.0};
    acc += static_cast<float>(cblas_ddot(2, x, 1, x, 1));
#endif

    std::printf("probe ok %f\n", static_cast<double>(acc));
    return 0;
}
"#;

/// Effective value of every `-DNAME=VALUE` flag, last one wins.
fn definitions(flags: &[String]) -> HashMap<&str, &str> {
    flags.iter().filter_map(|flag| split_definition(flag)).collect()
}

fn is_on(value: &str) -> bool {
    matches!(
        value.to_ascii_uppercase().as_str(),
        "ON" | "1" | "TRUE" | "YES" | "Y"
    )
}

/// `CMakeLists.txt` for the given candidate flags.
pub(crate) fn render_cmake_lists(flags: &[String]) -> String {
    let defs = definitions(flags);
    let enabled = |toggle: FeatureToggle| defs.get(toggle.cmake_name()).is_some_and(|v| is_on(v));

    let mut out = format!(
        "cmake_minimum_required(VERSION 3.14)\n\
         project({TARGET_NAME} CXX)\n\
         set(CMAKE_CXX_STANDARD 11)\n\
         set(CMAKE_CXX_STANDARD_REQUIRED ON)\n\
         add_executable({TARGET_NAME} probe.cpp)\n"
    );

    let isa = [
        (FeatureToggle::VectorBase, "-mavx"),
        (FeatureToggle::VectorExtended, "-mavx2"),
        (FeatureToggle::FusedMultiplyAdd, "-mfma"),
        (FeatureToggle::HalfPrecision, "-mf16c"),
        (FeatureToggle::BitManipulation, "-mbmi2"),
    ];
    let options: Vec<&str> = isa
        .iter()
        .filter(|(toggle, _)| enabled(*toggle))
        .map(|(_, option)| *option)
        .collect();
    if !options.is_empty() {
        out.push_str(&format!(
            "target_compile_options({TARGET_NAME} PRIVATE {})\n",
            options.join(" ")
        ));
    }

    if enabled(FeatureToggle::MathBackend) {
        if let Some(vendor) = defs.get("GGML_BLAS_PROVIDER") {
            out.push_str(&format!("set(BLA_VENDOR {vendor})\n"));
        }
        out.push_str(&format!(
            "find_package(BLAS REQUIRED)\n\
             target_compile_definitions({TARGET_NAME} PRIVATE PROBE_BLAS)\n\
             target_link_libraries({TARGET_NAME} PRIVATE ${{BLAS_LIBRARIES}})\n"
        ));
    }

    if enabled(FeatureToggle::ParallelRuntime) {
        out.push_str(&format!(
            "find_package(OpenMP REQUIRED COMPONENTS CXX)\n\
             target_compile_definitions({TARGET_NAME} PRIVATE PROBE_OPENMP)\n\
             target_link_libraries({TARGET_NAME} PRIVATE OpenMP::OpenMP_CXX)\n"
        ));
    }

    if enabled(FeatureToggle::HttpClient) {
        out.push_str(&format!(
            "find_package(CURL REQUIRED)\n\
             target_compile_definitions({TARGET_NAME} PRIVATE PROBE_CURL)\n\
             target_include_directories({TARGET_NAME} PRIVATE ${{CURL_INCLUDE_DIRS}})\n\
             target_link_libraries({TARGET_NAME} PRIVATE ${{CURL_LIBRARIES}})\n"
        ));
    }

    if enabled(FeatureToggle::LinkTimeOptimization) {
        out.push_str(&format!(
            "include(CheckIPOSupported)\n\
             check_ipo_supported(RESULT ipo_supported OUTPUT ipo_message LANGUAGES CXX)\n\
             if(NOT ipo_supported)\n  \
               message(FATAL_ERROR \"IPO not supported: ${{ipo_message}}\")\n\
             endif()\n\
             set_property(TARGET {TARGET_NAME} PROPERTY INTERPROCEDURAL_OPTIMIZATION TRUE)\n"
        ));
    }

    out
}

/// Scoped directory holding the probe sources and build tree.
///
/// Dropping it deletes everything, whichever way the probe returned.
#[derive(Debug)]
pub(crate) struct ProbeWorkspace {
    dir: TempDir,
}

impl ProbeWorkspace {
    pub(crate) fn create(flags: &[String]) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("ggforge-probe-").tempdir()?;
        fs::write(dir.path().join("CMakeLists.txt"), render_cmake_lists(flags))?;
        fs::write(dir.path().join("probe.cpp"), PROBE_SOURCE)?;
        fs::create_dir(dir.path().join("build"))?;
        Ok(Self { dir })
    }

    pub(crate) fn source_dir(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn build_dir(&self) -> PathBuf {
        self.dir.path().join("build")
    }

    /// Path of the verification binary if the build produced one.
    pub(crate) fn artifact(&self) -> Option<PathBuf> {
        let build = self.build_dir();
        [build.join(TARGET_NAME), build.join("Release").join(TARGET_NAME)]
            .into_iter()
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_baseline_descriptor_has_no_extras() {
        let text = render_cmake_lists(&flags(&["-DCMAKE_BUILD_TYPE=Release", "-DGGML_AVX=OFF"]));
        assert!(text.contains("add_executable(ggforge_probe probe.cpp)"));
        assert!(!text.contains("target_compile_options"));
        assert!(!text.contains("find_package"));
    }

    #[test]
    fn test_instruction_sets_become_compile_options() {
        let text = render_cmake_lists(&flags(&[
            "-DGGML_AVX=ON",
            "-DGGML_AVX2=ON",
            "-DGGML_FMA=OFF",
            "-DGGML_BMI2=ON",
        ]));
        assert!(text.contains("target_compile_options(ggforge_probe PRIVATE -mavx -mavx2 -mbmi2)"));
    }

    #[test]
    fn test_last_definition_wins() {
        let text = render_cmake_lists(&flags(&["-DGGML_F16C=OFF", "-DGGML_F16C=ON"]));
        assert!(text.contains("-mf16c"));
    }

    #[test]
    fn test_blas_provider_sets_vendor() {
        let text = render_cmake_lists(&flags(&["-DGGML_BLAS=ON", "-DGGML_BLAS_PROVIDER=OpenBLAS"]));
        assert!(text.contains("set(BLA_VENDOR OpenBLAS)"));
        assert!(text.contains("find_package(BLAS REQUIRED)"));
        assert!(text.contains("${BLAS_LIBRARIES}"));

        let generic = render_cmake_lists(&flags(&["-DGGML_BLAS=ON"]));
        assert!(!generic.contains("BLA_VENDOR"));
    }

    #[test]
    fn test_libraries_and_lto() {
        let text = render_cmake_lists(&flags(&[
            "-DGGML_OPENMP=ON",
            "-DLLAMA_CURL=ON",
            "-DGGML_LTO=ON",
        ]));
        assert!(text.contains("OpenMP::OpenMP_CXX"));
        assert!(text.contains("find_package(CURL REQUIRED)"));
        assert!(text.contains("check_ipo_supported"));
        assert!(text.contains("INTERPROCEDURAL_OPTIMIZATION TRUE"));
    }

    #[test]
    fn test_workspace_is_removed_on_drop() {
        let ws = ProbeWorkspace::create(&flags(&["-DGGML_AVX=ON"])).unwrap();
        let root = ws.source_dir().to_path_buf();
        assert!(root.join("CMakeLists.txt").is_file());
        assert!(root.join("probe.cpp").is_file());
        assert!(ws.build_dir().is_dir());
        assert!(ws.artifact().is_none());
        drop(ws);
        assert!(!root.exists());
    }
}
