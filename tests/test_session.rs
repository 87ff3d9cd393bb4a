// tests/test_session.rs — Compute session lifecycle and kernel dispatch,
// run against the host-emulated device.

use edgecl::gpu::status::*;
use edgecl::gpu::{
    ApiCall, CommandKind, EmulatedApi, EmulatedConfig, GpuError, GpuSession, GpuSessionConfig,
    ResourceKind,
};
use edgecl::gradient::sobel_magnitude_clamped;
use edgecl::image::Image;

fn gradient_frame(w: usize, h: usize) -> Image<u8> {
    let mut img = Image::new(w, h);
    for y in 0..h {
        for x in 0..w {
            img.set(x, y, ((x * 7 + y * 13) % 256) as u8);
        }
    }
    img
}

fn teardown_log(api: &EmulatedApi) -> Vec<ResourceKind> {
    api.release_log()
        .into_iter()
        .filter(|&k| k != ResourceKind::Event)
        .collect()
}

const TEARDOWN_ORDER: [ResourceKind; 7] = [
    ResourceKind::Image,
    ResourceKind::Image,
    ResourceKind::Kernel,
    ResourceKind::Program,
    ResourceKind::Queue,
    ResourceKind::Context,
    ResourceKind::Device,
];

// ===== Construction =====

#[test]
fn session_reports_device_and_geometry() {
    let api = EmulatedApi::new(EmulatedConfig {
        work_group_multiple: 64,
        ..EmulatedConfig::default()
    });
    let session = GpuSession::new(api.clone(), 1000, 9).unwrap();

    assert_eq!(session.device().name, "Emulated GPU");
    assert_eq!(session.work_group_multiple(), 64);
    assert_eq!(session.geometry().global, [1024, 9]);
    assert_eq!(session.geometry().local, [64, 1]);
    assert_eq!(session.frame_len(), 9000);
    // context, queue, program, 2 images, kernel
    assert_eq!(api.live_resources(), 6);
    session.destroy().unwrap();
}

#[test]
fn zero_dimensions_rejected_before_any_call() {
    let api = EmulatedApi::default();
    let err = GpuSession::new(api.clone(), 0, 480).unwrap_err();
    assert!(matches!(err, GpuError::InvalidDimensions { width: 0, height: 480 }));
    assert_eq!(api.calls(), 0);
}

#[test]
fn no_platform() {
    let api = EmulatedApi::new(EmulatedConfig {
        platforms: 0,
        ..EmulatedConfig::default()
    });
    let err = GpuSession::new(api.clone(), 8, 8).unwrap_err();
    assert!(matches!(err, GpuError::NoPlatformAvailable));
    assert_eq!(api.live_resources(), 0);
}

#[test]
fn no_gpu_device() {
    let api = EmulatedApi::new(EmulatedConfig {
        gpu_devices: 0,
        ..EmulatedConfig::default()
    });
    let err = GpuSession::new(api.clone(), 8, 8).unwrap_err();
    assert!(matches!(err, GpuError::NoDeviceAvailable));
    assert!(err.is_device_absent());
    assert_eq!(api.live_resources(), 0);
}

#[test]
fn build_failure_carries_log_and_releases_everything() {
    let api = EmulatedApi::default();
    let config = GpuSessionConfig::new(8, 8).with_kernel_source("__kernel void sobel() {");
    let err = GpuSession::with_config(api.clone(), config).unwrap_err();

    match err {
        GpuError::KernelBuildFailure { log } => {
            assert!(log.starts_with("Device 0\n"), "{log}");
            assert!(log.contains("expected '}'"), "{log}");
        }
        other => panic!("expected KernelBuildFailure, got {other:?}"),
    }
    assert_eq!(api.live_resources(), 0);
    assert_eq!(
        teardown_log(&api),
        [
            ResourceKind::Program,
            ResourceKind::Queue,
            ResourceKind::Context,
            ResourceKind::Device
        ]
    );
}

#[test]
fn unknown_entry_point_is_api_error() {
    let api = EmulatedApi::default();
    let config = GpuSessionConfig::new(8, 8).with_kernel_entry("blur");
    let err = GpuSession::with_config(api.clone(), config).unwrap_err();
    assert!(matches!(
        err,
        GpuError::ComputeApi { operation: "clCreateKernel", code: CL_INVALID_KERNEL_NAME, .. }
    ));
    assert_eq!(api.live_resources(), 0);
}

#[test]
fn failure_at_every_construction_step_leaks_nothing() {
    let steps = [
        ApiCall::CreateContext,
        ApiCall::CreateQueue,
        ApiCall::CreateProgram,
        ApiCall::CreateImage,
        ApiCall::CreateKernel,
        ApiCall::SetKernelArg,
        ApiCall::WorkGroupMultiple,
    ];
    for step in steps {
        let api = EmulatedApi::default();
        api.fail_next(step, CL_OUT_OF_RESOURCES);
        let err = GpuSession::new(api.clone(), 16, 16).unwrap_err();
        assert_eq!(err.status_code(), Some(CL_OUT_OF_RESOURCES), "{step:?}");
        assert_eq!(api.live_resources(), 0, "leak after failing {step:?}");
        assert_eq!(teardown_log(&api).last(), Some(&ResourceKind::Device), "{step:?}");
    }
}

#[test]
fn output_image_failure_releases_input_image() {
    let api = EmulatedApi::default();
    api.fail_after(ApiCall::CreateImage, 1, CL_MEM_OBJECT_ALLOCATION_FAILURE);
    let err = GpuSession::new(api.clone(), 16, 16).unwrap_err();
    assert!(matches!(
        err,
        GpuError::ComputeApi { operation: "clCreateImage", code: CL_MEM_OBJECT_ALLOCATION_FAILURE, .. }
    ));
    assert_eq!(api.call_count(ApiCall::CreateImage), 2);
    assert_eq!(api.live_resources(), 0);
    assert_eq!(
        teardown_log(&api),
        [
            ResourceKind::Image,
            ResourceKind::Program,
            ResourceKind::Queue,
            ResourceKind::Context,
            ResourceKind::Device
        ]
    );
}

#[test]
fn output_arg_bind_failure_releases_everything() {
    let api = EmulatedApi::default();
    api.fail_after(ApiCall::SetKernelArg, 1, CL_INVALID_ARG_VALUE);
    let err = GpuSession::new(api.clone(), 16, 16).unwrap_err();
    assert!(matches!(
        err,
        GpuError::ComputeApi { operation: "clSetKernelArg", code: CL_INVALID_ARG_VALUE, .. }
    ));
    assert_eq!(api.call_count(ApiCall::SetKernelArg), 2);
    assert_eq!(api.live_resources(), 0);
    assert_eq!(teardown_log(&api), TEARDOWN_ORDER);
}

#[test]
fn zero_work_group_multiple_treated_as_one() {
    let api = EmulatedApi::new(EmulatedConfig {
        work_group_multiple: 0,
        ..EmulatedConfig::default()
    });
    let mut session = GpuSession::new(api, 5, 3).unwrap();
    assert_eq!(session.work_group_multiple(), 1);
    assert_eq!(session.geometry().global, [5, 3]);
    let mut frame = vec![7u8; 15];
    session.transform(&mut frame).unwrap();
}

// ===== Dispatch =====

#[test]
fn uniform_frame_filters_to_zero() {
    let api = EmulatedApi::default();
    let mut session = GpuSession::new(api, 64, 48).unwrap();
    let mut frame = vec![128u8; 64 * 48];
    session.transform(&mut frame).unwrap();
    assert!(frame.iter().all(|&p| p == 0));
}

#[test]
fn output_matches_clamped_cpu_reference() {
    let api = EmulatedApi::default();
    let mut session = GpuSession::new(api, 37, 23).unwrap();
    let mut frame = gradient_frame(37, 23);
    let expected = sobel_magnitude_clamped(&frame);
    session.transform_image(&mut frame).unwrap();
    assert_eq!(frame, expected);
}

#[test]
fn commands_are_chained_by_events() {
    let api = EmulatedApi::default();
    let mut session = GpuSession::new(api.clone(), 16, 16).unwrap();
    let mut frame = vec![1u8; 256];
    session.transform(&mut frame).unwrap();

    let commands = api.commands();
    assert_eq!(commands.len(), 3);
    let (write, kernel, read) = (&commands[0], &commands[1], &commands[2]);
    assert_eq!(write.kind, CommandKind::WriteImage);
    assert_eq!(kernel.kind, CommandKind::Kernel);
    assert_eq!(read.kind, CommandKind::ReadImage);
    assert!(write.wait.is_empty());
    assert_eq!(kernel.wait, vec![write.event]);
    assert_eq!(read.wait, vec![kernel.event]);
}

#[test]
fn events_released_every_frame() {
    let api = EmulatedApi::default();
    let mut session = GpuSession::new(api.clone(), 16, 8).unwrap();
    let baseline = api.live_resources();
    let mut frame = gradient_frame(16, 8);
    for _ in 0..5 {
        session.transform_image(&mut frame).unwrap();
        assert_eq!(api.live(ResourceKind::Event), 0);
    }
    assert_eq!(api.live_resources(), baseline);
    assert_eq!(api.call_count(ApiCall::ReleaseEvent), 15);
}

#[test]
fn events_released_when_read_fails() {
    let api = EmulatedApi::default();
    let mut session = GpuSession::new(api.clone(), 8, 8).unwrap();
    api.fail_next(ApiCall::EnqueueRead, CL_OUT_OF_RESOURCES);
    let mut frame = vec![0u8; 64];
    let err = session.transform(&mut frame).unwrap_err();
    assert!(matches!(
        err,
        GpuError::ComputeApi { operation: "clEnqueueReadImage", .. }
    ));
    assert_eq!(api.live(ResourceKind::Event), 0);
    assert_eq!(session.telemetry().frames(), 0);
}

#[test]
fn failure_at_every_dispatch_step_keeps_session_usable() {
    let steps = [
        (ApiCall::EnqueueWrite, "clEnqueueWriteImage"),
        (ApiCall::EnqueueKernel, "clEnqueueNDRangeKernel"),
        (ApiCall::WaitForEvents, "clWaitForEvents"),
        (ApiCall::ProfilingTimes, "clGetEventProfilingInfo"),
    ];
    for (step, name) in steps {
        let api = EmulatedApi::default();
        let mut session = GpuSession::new(api.clone(), 8, 8).unwrap();
        api.fail_next(step, CL_OUT_OF_RESOURCES);

        let mut frame = vec![9u8; 64];
        let err = session.transform(&mut frame).unwrap_err();
        match err {
            GpuError::ComputeApi { operation, code, .. } => {
                assert_eq!(operation, name);
                assert_eq!(code, CL_OUT_OF_RESOURCES);
            }
            other => panic!("{step:?}: expected ComputeApi, got {other:?}"),
        }
        assert_eq!(api.live(ResourceKind::Event), 0, "event leak after failing {step:?}");
        assert_eq!(session.telemetry().frames(), 0, "{step:?}");

        // The next frame goes through normally.
        let mut frame = vec![9u8; 64];
        session.transform(&mut frame).unwrap();
        assert!(frame.iter().all(|&p| p == 0), "{step:?}");
        assert_eq!(session.telemetry().frames(), 1, "{step:?}");
        assert_eq!(api.live(ResourceKind::Event), 0, "{step:?}");
        session.destroy().unwrap();
    }
}

#[test]
fn event_release_failure_does_not_fail_the_frame() {
    let api = EmulatedApi::default();
    let mut session = GpuSession::new(api.clone(), 8, 8).unwrap();
    api.fail_after(ApiCall::ReleaseEvent, 1, CL_INVALID_EVENT);

    let mut frame = vec![200u8; 64];
    let timing = session.transform(&mut frame).unwrap();
    assert!(frame.iter().all(|&p| p == 0));
    assert_eq!(session.telemetry().frames(), 1);
    assert_eq!(session.telemetry().current_ms(), Some(timing.elapsed_ms));
    // The remaining events were still released.
    assert_eq!(api.call_count(ApiCall::ReleaseEvent), 3);
    assert_eq!(api.live(ResourceKind::Event), 1);
}

#[test]
fn dimension_mismatch_issues_no_device_call() {
    let api = EmulatedApi::default();
    let mut session = GpuSession::new(api.clone(), 8, 8).unwrap();
    let before = api.calls();

    let mut short = vec![0u8; 63];
    let err = session.transform(&mut short).unwrap_err();
    assert!(matches!(err, GpuError::DimensionMismatch { expected: 64, actual: 63 }));

    let mut wrong_shape = Image::<u8>::new(16, 4);
    assert!(matches!(
        session.transform_image(&mut wrong_shape),
        Err(GpuError::DimensionMismatch { .. })
    ));
    assert_eq!(api.calls(), before);
}

#[test]
fn kernel_time_is_queued_to_end() {
    // latency 1000 ns, 2 ns per launched item, multiple 8 → global 16x4.
    let api = EmulatedApi::new(EmulatedConfig {
        work_group_multiple: 8,
        queue_latency_ns: 1_000,
        kernel_ns_per_pixel: 2,
        ..EmulatedConfig::default()
    });
    let mut session = GpuSession::new(api, 10, 4).unwrap();
    let mut frame = vec![0u8; 40];
    let timing = session.transform(&mut frame).unwrap();

    let expected_ms = (1_000 + 16 * 4 * 2) as f64 * 1e-6;
    assert!((timing.elapsed_ms - expected_ms).abs() < 1e-12);
    assert!((timing.execution_ms - 128.0e-6).abs() < 1e-12);
    assert_eq!(session.telemetry().frames(), 1);
    assert_eq!(session.telemetry().current_ms(), Some(timing.elapsed_ms));
}

// ===== Teardown =====

#[test]
fn destroy_releases_in_fixed_order() {
    let api = EmulatedApi::default();
    let mut session = GpuSession::new(api.clone(), 8, 8).unwrap();
    let mut frame = vec![3u8; 64];
    session.transform(&mut frame).unwrap();
    session.destroy().unwrap();

    assert_eq!(api.live_resources(), 0);
    assert_eq!(teardown_log(&api), TEARDOWN_ORDER);
}

#[test]
fn drop_runs_the_same_teardown() {
    let api = EmulatedApi::default();
    {
        let _session = GpuSession::new(api.clone(), 8, 8).unwrap();
    }
    assert_eq!(api.live_resources(), 0);
    assert_eq!(teardown_log(&api), TEARDOWN_ORDER);
}

#[test]
fn destroy_attempts_every_release_and_reports_first_failure() {
    let api = EmulatedApi::default();
    let session = GpuSession::new(api.clone(), 8, 8).unwrap();
    api.fail_next(ApiCall::ReleaseKernel, CL_INVALID_KERNEL);
    api.fail_next(ApiCall::ReleaseContext, CL_INVALID_CONTEXT);

    let err = session.destroy().unwrap_err();
    assert!(matches!(
        err,
        GpuError::ComputeApi { operation: "clReleaseKernel", code: CL_INVALID_KERNEL, .. }
    ));
    // Every release was still attempted.
    for call in [
        ApiCall::ReleaseImage,
        ApiCall::ReleaseKernel,
        ApiCall::ReleaseProgram,
        ApiCall::ReleaseQueue,
        ApiCall::ReleaseContext,
        ApiCall::ReleaseDevice,
    ] {
        assert!(api.call_count(call) >= 1, "{call:?} not attempted");
    }
    assert_eq!(api.call_count(ApiCall::ReleaseImage), 2);
    // Only the two injected failures survive in the ledger.
    assert_eq!(api.live(ResourceKind::Kernel), 1);
    assert_eq!(api.live(ResourceKind::Context), 1);
    assert_eq!(api.live_resources(), 2);
}

#[test]
fn teardown_happens_once() {
    let api = EmulatedApi::default();
    let session = GpuSession::new(api.clone(), 8, 8).unwrap();
    session.destroy().unwrap();
    // destroy consumed the session; Drop must not release again.
    assert_eq!(api.call_count(ApiCall::ReleaseContext), 1);
    assert_eq!(api.call_count(ApiCall::ReleaseDevice), 1);
}
