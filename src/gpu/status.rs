// gpu/status.rs — Status-checked call layer.
//
// Every compute-API entry point reports a numeric status (`cl_int`). Raw
// backend calls surface that as `Result<T, ClStatus>`; this layer is the one
// place that turns a failing status into a `GpuError`, so nothing above it
// ever handles a bare code.
//
//   raw call ──► Result<T, ClStatus> ──► check("clCreateContext", ..)
//                                           │
//                                           ├─ Ok(T)
//                                           └─ Err(GpuError::ComputeApi {
//                                                 operation, code, name })
//
// Program builds get their own variant: a generic CL_BUILD_PROGRAM_FAILURE
// says nothing about WHY the source failed, so `check_build` pulls the
// per-device build log and returns it verbatim.
//
// The numeric values are the OpenCL 1.2 ones (plus the ICD loader's
// CL_PLATFORM_NOT_FOUND_KHR). They are defined here rather than imported so
// the layer is available without the `opencl` feature.

use crate::gpu::error::GpuError;

/// A compute-API status code. `CL_SUCCESS` (0) is the only success value.
pub type ClStatus = i32;

/// Raw result of one compute-API call.
pub type ApiResult<T> = std::result::Result<T, ClStatus>;

pub const CL_SUCCESS: ClStatus = 0;
pub const CL_DEVICE_NOT_FOUND: ClStatus = -1;
pub const CL_DEVICE_NOT_AVAILABLE: ClStatus = -2;
pub const CL_COMPILER_NOT_AVAILABLE: ClStatus = -3;
pub const CL_MEM_OBJECT_ALLOCATION_FAILURE: ClStatus = -4;
pub const CL_OUT_OF_RESOURCES: ClStatus = -5;
pub const CL_OUT_OF_HOST_MEMORY: ClStatus = -6;
pub const CL_PROFILING_INFO_NOT_AVAILABLE: ClStatus = -7;
pub const CL_MEM_COPY_OVERLAP: ClStatus = -8;
pub const CL_IMAGE_FORMAT_MISMATCH: ClStatus = -9;
pub const CL_IMAGE_FORMAT_NOT_SUPPORTED: ClStatus = -10;
pub const CL_BUILD_PROGRAM_FAILURE: ClStatus = -11;
pub const CL_MAP_FAILURE: ClStatus = -12;
pub const CL_MISALIGNED_SUB_BUFFER_OFFSET: ClStatus = -13;
pub const CL_EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST: ClStatus = -14;
pub const CL_COMPILE_PROGRAM_FAILURE: ClStatus = -15;
pub const CL_LINKER_NOT_AVAILABLE: ClStatus = -16;
pub const CL_LINK_PROGRAM_FAILURE: ClStatus = -17;
pub const CL_DEVICE_PARTITION_FAILED: ClStatus = -18;
pub const CL_KERNEL_ARG_INFO_NOT_AVAILABLE: ClStatus = -19;
pub const CL_INVALID_VALUE: ClStatus = -30;
pub const CL_INVALID_DEVICE_TYPE: ClStatus = -31;
pub const CL_INVALID_PLATFORM: ClStatus = -32;
pub const CL_INVALID_DEVICE: ClStatus = -33;
pub const CL_INVALID_CONTEXT: ClStatus = -34;
pub const CL_INVALID_QUEUE_PROPERTIES: ClStatus = -35;
pub const CL_INVALID_COMMAND_QUEUE: ClStatus = -36;
pub const CL_INVALID_HOST_PTR: ClStatus = -37;
pub const CL_INVALID_MEM_OBJECT: ClStatus = -38;
pub const CL_INVALID_IMAGE_FORMAT_DESCRIPTOR: ClStatus = -39;
pub const CL_INVALID_IMAGE_SIZE: ClStatus = -40;
pub const CL_INVALID_SAMPLER: ClStatus = -41;
pub const CL_INVALID_BINARY: ClStatus = -42;
pub const CL_INVALID_BUILD_OPTIONS: ClStatus = -43;
pub const CL_INVALID_PROGRAM: ClStatus = -44;
pub const CL_INVALID_PROGRAM_EXECUTABLE: ClStatus = -45;
pub const CL_INVALID_KERNEL_NAME: ClStatus = -46;
pub const CL_INVALID_KERNEL_DEFINITION: ClStatus = -47;
pub const CL_INVALID_KERNEL: ClStatus = -48;
pub const CL_INVALID_ARG_INDEX: ClStatus = -49;
pub const CL_INVALID_ARG_VALUE: ClStatus = -50;
pub const CL_INVALID_ARG_SIZE: ClStatus = -51;
pub const CL_INVALID_KERNEL_ARGS: ClStatus = -52;
pub const CL_INVALID_WORK_DIMENSION: ClStatus = -53;
pub const CL_INVALID_WORK_GROUP_SIZE: ClStatus = -54;
pub const CL_INVALID_WORK_ITEM_SIZE: ClStatus = -55;
pub const CL_INVALID_GLOBAL_OFFSET: ClStatus = -56;
pub const CL_INVALID_EVENT_WAIT_LIST: ClStatus = -57;
pub const CL_INVALID_EVENT: ClStatus = -58;
pub const CL_INVALID_OPERATION: ClStatus = -59;
pub const CL_INVALID_GL_OBJECT: ClStatus = -60;
pub const CL_INVALID_BUFFER_SIZE: ClStatus = -61;
pub const CL_INVALID_MIP_LEVEL: ClStatus = -62;
pub const CL_INVALID_GLOBAL_WORK_SIZE: ClStatus = -63;
pub const CL_INVALID_PROPERTY: ClStatus = -64;
pub const CL_INVALID_IMAGE_DESCRIPTOR: ClStatus = -65;
pub const CL_INVALID_COMPILER_OPTIONS: ClStatus = -66;
pub const CL_INVALID_LINKER_OPTIONS: ClStatus = -67;
pub const CL_INVALID_DEVICE_PARTITION_COUNT: ClStatus = -68;
pub const CL_PLATFORM_NOT_FOUND_KHR: ClStatus = -1001;

/// Decode a status code into its symbolic name.
pub fn status_name(code: ClStatus) -> &'static str {
    match code {
        CL_SUCCESS => "CL_SUCCESS",
        CL_DEVICE_NOT_FOUND => "CL_DEVICE_NOT_FOUND",
        CL_DEVICE_NOT_AVAILABLE => "CL_DEVICE_NOT_AVAILABLE",
        CL_COMPILER_NOT_AVAILABLE => "CL_COMPILER_NOT_AVAILABLE",
        CL_MEM_OBJECT_ALLOCATION_FAILURE => "CL_MEM_OBJECT_ALLOCATION_FAILURE",
        CL_OUT_OF_RESOURCES => "CL_OUT_OF_RESOURCES",
        CL_OUT_OF_HOST_MEMORY => "CL_OUT_OF_HOST_MEMORY",
        CL_PROFILING_INFO_NOT_AVAILABLE => "CL_PROFILING_INFO_NOT_AVAILABLE",
        CL_MEM_COPY_OVERLAP => "CL_MEM_COPY_OVERLAP",
        CL_IMAGE_FORMAT_MISMATCH => "CL_IMAGE_FORMAT_MISMATCH",
        CL_IMAGE_FORMAT_NOT_SUPPORTED => "CL_IMAGE_FORMAT_NOT_SUPPORTED",
        CL_BUILD_PROGRAM_FAILURE => "CL_BUILD_PROGRAM_FAILURE",
        CL_MAP_FAILURE => "CL_MAP_FAILURE",
        CL_MISALIGNED_SUB_BUFFER_OFFSET => "CL_MISALIGNED_SUB_BUFFER_OFFSET",
        CL_EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST => {
            "CL_EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST"
        }
        CL_COMPILE_PROGRAM_FAILURE => "CL_COMPILE_PROGRAM_FAILURE",
        CL_LINKER_NOT_AVAILABLE => "CL_LINKER_NOT_AVAILABLE",
        CL_LINK_PROGRAM_FAILURE => "CL_LINK_PROGRAM_FAILURE",
        CL_DEVICE_PARTITION_FAILED => "CL_DEVICE_PARTITION_FAILED",
        CL_KERNEL_ARG_INFO_NOT_AVAILABLE => "CL_KERNEL_ARG_INFO_NOT_AVAILABLE",
        CL_INVALID_VALUE => "CL_INVALID_VALUE",
        CL_INVALID_DEVICE_TYPE => "CL_INVALID_DEVICE_TYPE",
        CL_INVALID_PLATFORM => "CL_INVALID_PLATFORM",
        CL_INVALID_DEVICE => "CL_INVALID_DEVICE",
        CL_INVALID_CONTEXT => "CL_INVALID_CONTEXT",
        CL_INVALID_QUEUE_PROPERTIES => "CL_INVALID_QUEUE_PROPERTIES",
        CL_INVALID_COMMAND_QUEUE => "CL_INVALID_COMMAND_QUEUE",
        CL_INVALID_HOST_PTR => "CL_INVALID_HOST_PTR",
        CL_INVALID_MEM_OBJECT => "CL_INVALID_MEM_OBJECT",
        CL_INVALID_IMAGE_FORMAT_DESCRIPTOR => "CL_INVALID_IMAGE_FORMAT_DESCRIPTOR",
        CL_INVALID_IMAGE_SIZE => "CL_INVALID_IMAGE_SIZE",
        CL_INVALID_SAMPLER => "CL_INVALID_SAMPLER",
        CL_INVALID_BINARY => "CL_INVALID_BINARY",
        CL_INVALID_BUILD_OPTIONS => "CL_INVALID_BUILD_OPTIONS",
        CL_INVALID_PROGRAM => "CL_INVALID_PROGRAM",
        CL_INVALID_PROGRAM_EXECUTABLE => "CL_INVALID_PROGRAM_EXECUTABLE",
        CL_INVALID_KERNEL_NAME => "CL_INVALID_KERNEL_NAME",
        CL_INVALID_KERNEL_DEFINITION => "CL_INVALID_KERNEL_DEFINITION",
        CL_INVALID_KERNEL => "CL_INVALID_KERNEL",
        CL_INVALID_ARG_INDEX => "CL_INVALID_ARG_INDEX",
        CL_INVALID_ARG_VALUE => "CL_INVALID_ARG_VALUE",
        CL_INVALID_ARG_SIZE => "CL_INVALID_ARG_SIZE",
        CL_INVALID_KERNEL_ARGS => "CL_INVALID_KERNEL_ARGS",
        CL_INVALID_WORK_DIMENSION => "CL_INVALID_WORK_DIMENSION",
        CL_INVALID_WORK_GROUP_SIZE => "CL_INVALID_WORK_GROUP_SIZE",
        CL_INVALID_WORK_ITEM_SIZE => "CL_INVALID_WORK_ITEM_SIZE",
        CL_INVALID_GLOBAL_OFFSET => "CL_INVALID_GLOBAL_OFFSET",
        CL_INVALID_EVENT_WAIT_LIST => "CL_INVALID_EVENT_WAIT_LIST",
        CL_INVALID_EVENT => "CL_INVALID_EVENT",
        CL_INVALID_OPERATION => "CL_INVALID_OPERATION",
        CL_INVALID_GL_OBJECT => "CL_INVALID_GL_OBJECT",
        CL_INVALID_BUFFER_SIZE => "CL_INVALID_BUFFER_SIZE",
        CL_INVALID_MIP_LEVEL => "CL_INVALID_MIP_LEVEL",
        CL_INVALID_GLOBAL_WORK_SIZE => "CL_INVALID_GLOBAL_WORK_SIZE",
        CL_INVALID_PROPERTY => "CL_INVALID_PROPERTY",
        CL_INVALID_IMAGE_DESCRIPTOR => "CL_INVALID_IMAGE_DESCRIPTOR",
        CL_INVALID_COMPILER_OPTIONS => "CL_INVALID_COMPILER_OPTIONS",
        CL_INVALID_LINKER_OPTIONS => "CL_INVALID_LINKER_OPTIONS",
        CL_INVALID_DEVICE_PARTITION_COUNT => "CL_INVALID_DEVICE_PARTITION_COUNT",
        CL_PLATFORM_NOT_FOUND_KHR => "CL_PLATFORM_NOT_FOUND_KHR",
        _ => "CL_UNKNOWN_ERROR",
    }
}

/// Convert a raw call result into a typed one.
#[inline]
pub fn check<T>(operation: &'static str, raw: ApiResult<T>) -> Result<T, GpuError> {
    raw.map_err(|code| GpuError::compute_api(operation, code))
}

/// Check a bare status code.
#[inline]
pub fn check_status(operation: &'static str, code: ClStatus) -> Result<(), GpuError> {
    if code == CL_SUCCESS {
        Ok(())
    } else {
        Err(GpuError::compute_api(operation, code))
    }
}

/// Build-specific check.
///
/// On `CL_BUILD_PROGRAM_FAILURE` the build log of each device is fetched
/// through `fetch_log` and aggregated as `"Device {i}\n{log}\n\n"`. A device
/// whose log can't be retrieved contributes the name of the status that
/// prevented it, so the result is never an empty log. Every other failure
/// goes through [`check`].
pub fn check_build<D: Copy>(
    operation: &'static str,
    raw: ApiResult<()>,
    devices: &[D],
    mut fetch_log: impl FnMut(D) -> ApiResult<String>,
) -> Result<(), GpuError> {
    match raw {
        Ok(()) => Ok(()),
        Err(CL_BUILD_PROGRAM_FAILURE) => {
            let mut log = String::new();
            for (i, &device) in devices.iter().enumerate() {
                let text = match fetch_log(device) {
                    Ok(text) => text,
                    Err(code) => format!("<build log unavailable: {}>", status_name(code)),
                };
                log.push_str(&format!("Device {i}\n{}\n\n", text.trim_end_matches('\0')));
            }
            if devices.is_empty() {
                log.push_str(status_name(CL_BUILD_PROGRAM_FAILURE));
            }
            Err(GpuError::KernelBuildFailure { log })
        }
        Err(code) => Err(GpuError::compute_api(operation, code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names() {
        assert_eq!(status_name(CL_SUCCESS), "CL_SUCCESS");
        assert_eq!(status_name(CL_OUT_OF_RESOURCES), "CL_OUT_OF_RESOURCES");
        assert_eq!(status_name(CL_INVALID_WORK_GROUP_SIZE), "CL_INVALID_WORK_GROUP_SIZE");
        assert_eq!(status_name(CL_PLATFORM_NOT_FOUND_KHR), "CL_PLATFORM_NOT_FOUND_KHR");
        assert_eq!(status_name(-9999), "CL_UNKNOWN_ERROR");
    }

    #[test]
    fn test_check_passes_value_through() {
        assert_eq!(check("clGetPlatformIDs", Ok(7)).ok(), Some(7));
    }

    #[test]
    fn test_check_decodes_failure() {
        let err = check::<()>("clCreateContext", Err(CL_OUT_OF_HOST_MEMORY)).unwrap_err();
        match &err {
            GpuError::ComputeApi { operation, code, name } => {
                assert_eq!(*operation, "clCreateContext");
                assert_eq!(*code, CL_OUT_OF_HOST_MEMORY);
                assert_eq!(*name, "CL_OUT_OF_HOST_MEMORY");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "clCreateContext: CL_OUT_OF_HOST_MEMORY (-6)");
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("clFinish", CL_SUCCESS).is_ok());
        assert!(matches!(
            check_status("clFinish", CL_INVALID_COMMAND_QUEUE),
            Err(GpuError::ComputeApi { code: CL_INVALID_COMMAND_QUEUE, .. })
        ));
    }

    #[test]
    fn test_check_build_collects_every_device_log() {
        let err = check_build(
            "clBuildProgram",
            Err(CL_BUILD_PROGRAM_FAILURE),
            &[10u32, 11],
            |device| Ok(format!("error on {device}\0")),
        )
        .unwrap_err();
        match err {
            GpuError::KernelBuildFailure { log } => {
                assert_eq!(log, "Device 0\nerror on 10\n\nDevice 1\nerror on 11\n\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_build_reports_unavailable_log() {
        let err = check_build("clBuildProgram", Err(CL_BUILD_PROGRAM_FAILURE), &[0u32], |_| {
            Err(CL_INVALID_DEVICE)
        })
        .unwrap_err();
        let GpuError::KernelBuildFailure { log } = err else {
            panic!("expected KernelBuildFailure");
        };
        assert!(log.contains("CL_INVALID_DEVICE"));
    }

    #[test]
    fn test_check_build_other_codes_are_api_errors() {
        let err = check_build("clBuildProgram", Err(CL_INVALID_BUILD_OPTIONS), &[0u32], |_| {
            Ok(String::new())
        })
        .unwrap_err();
        assert!(matches!(err, GpuError::ComputeApi { code: CL_INVALID_BUILD_OPTIONS, .. }));
    }
}
