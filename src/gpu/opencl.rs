// gpu/opencl.rs — `ComputeApi` over a real OpenCL runtime (feature "opencl").
//
// Built on `cl3`, the raw FFI layer: handles are the bare `cl_*` pointers,
// and nothing is released implicitly. Lifetime and release order belong to
// `GpuSession`.
//
// The image write and read are BLOCKING enqueues. The safe trait methods
// borrow the host slice only for the duration of the call, so the runtime
// must be done with it before returning. Event dependencies are still
// declared on every command so the queue sees the write → kernel → read
// chain explicitly.
//
// Every cl3 call is wrapped in `unsafe`: some are `unsafe fn`, and all of
// them hand raw handles across the FFI boundary.

#![allow(unused_unsafe)]

use std::ffi::{c_void, CString};
use std::ptr;

use cl3::command_queue::{
    create_command_queue, enqueue_nd_range_kernel, enqueue_read_image, enqueue_write_image,
    release_command_queue, CL_QUEUE_PROFILING_ENABLE,
};
use cl3::context::{create_context, release_context};
use cl3::device::{get_device_ids, get_device_info, release_device, CL_DEVICE_NAME, CL_DEVICE_TYPE_GPU};
use cl3::event::{
    get_event_profiling_info, release_event, wait_for_events, CL_PROFILING_COMMAND_END,
    CL_PROFILING_COMMAND_QUEUED, CL_PROFILING_COMMAND_START, CL_PROFILING_COMMAND_SUBMIT,
};
use cl3::kernel::{
    create_kernel, get_kernel_work_group_info, release_kernel, set_kernel_arg,
    CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE,
};
use cl3::memory::{
    create_image, release_mem_object, CL_MEM_OBJECT_IMAGE2D, CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY,
    CL_R, CL_UNSIGNED_INT8,
};
use cl3::platform::get_platform_ids;
use cl3::program::{
    build_program, create_program_with_source, get_program_build_info, release_program,
    CL_PROGRAM_BUILD_LOG,
};
use cl3::types::{
    cl_command_queue, cl_context, cl_device_id, cl_event, cl_image_desc, cl_image_format,
    cl_kernel, cl_mem, cl_mem_flags, cl_platform_id, cl_program, cl_uint, cl_ulong, CL_BLOCKING,
};

use crate::gpu::api::{ComputeApi, EventTimes, ImageAccess};
use crate::gpu::status::{ApiResult, CL_INVALID_BUILD_OPTIONS, CL_INVALID_KERNEL_NAME, CL_INVALID_VALUE};

/// The system's OpenCL runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenClApi;

impl OpenClApi {
    pub fn new() -> Self {
        OpenClApi
    }
}

/// Full-image region for a `width×height` 2D image.
fn region(width: usize, height: usize) -> ([usize; 3], [usize; 3]) {
    ([0, 0, 0], [width, height, 1])
}

fn wait_list(wait: &[cl_event]) -> (cl_uint, *const cl_event) {
    if wait.is_empty() {
        (0, ptr::null())
    } else {
        (wait.len() as cl_uint, wait.as_ptr())
    }
}

fn profiling_value(event: cl_event, param: cl_uint) -> ApiResult<u64> {
    let info = unsafe { get_event_profiling_info(event, param) }?;
    let value: cl_ulong = info.into();
    Ok(value)
}

impl ComputeApi for OpenClApi {
    type Platform = cl_platform_id;
    type Device = cl_device_id;
    type Context = cl_context;
    type Queue = cl_command_queue;
    type Program = cl_program;
    type Kernel = cl_kernel;
    type Image = cl_mem;
    type Event = cl_event;

    fn platforms(&self) -> ApiResult<Vec<cl_platform_id>> {
        unsafe { get_platform_ids() }
    }

    fn gpu_devices(&self, platform: cl_platform_id) -> ApiResult<Vec<cl_device_id>> {
        unsafe { get_device_ids(platform, CL_DEVICE_TYPE_GPU) }
    }

    fn device_name(&self, device: cl_device_id) -> ApiResult<String> {
        let info = unsafe { get_device_info(device, CL_DEVICE_NAME) }?;
        let name: String = info.into();
        Ok(name.trim_end_matches('\0').to_string())
    }

    fn create_context(&self, device: cl_device_id) -> ApiResult<cl_context> {
        unsafe { create_context(&[device], ptr::null(), None, ptr::null_mut()) }
    }

    fn create_profiling_queue(
        &self,
        context: cl_context,
        device: cl_device_id,
    ) -> ApiResult<cl_command_queue> {
        unsafe { create_command_queue(context, device, CL_QUEUE_PROFILING_ENABLE) }
    }

    fn create_program(&self, context: cl_context, source: &str) -> ApiResult<cl_program> {
        unsafe { create_program_with_source(context, &[source]) }
    }

    fn build_program(
        &self,
        program: cl_program,
        devices: &[cl_device_id],
        options: &str,
    ) -> ApiResult<()> {
        let options = CString::new(options).map_err(|_| CL_INVALID_BUILD_OPTIONS)?;
        unsafe { build_program(program, devices, &options, None, ptr::null_mut()) }
    }

    fn build_log(&self, program: cl_program, device: cl_device_id) -> ApiResult<String> {
        let info = unsafe { get_program_build_info(program, device, CL_PROGRAM_BUILD_LOG) }?;
        let log: String = info.into();
        Ok(log)
    }

    fn create_image(
        &self,
        context: cl_context,
        access: ImageAccess,
        width: usize,
        height: usize,
    ) -> ApiResult<cl_mem> {
        let flags: cl_mem_flags = match access {
            ImageAccess::ReadOnly => CL_MEM_READ_ONLY,
            ImageAccess::WriteOnly => CL_MEM_WRITE_ONLY,
        };
        let format = cl_image_format {
            image_channel_order: CL_R,
            image_channel_data_type: CL_UNSIGNED_INT8,
        };
        // SAFETY: cl_image_desc is a plain C struct; all-zero is its documented
        // "unused" state for every field not set below.
        let mut desc: cl_image_desc = unsafe { std::mem::zeroed() };
        desc.image_type = CL_MEM_OBJECT_IMAGE2D;
        desc.image_width = width;
        desc.image_height = height;
        unsafe { create_image(context, flags, &format, &desc, ptr::null_mut()) }
    }

    fn create_kernel(&self, program: cl_program, entry: &str) -> ApiResult<cl_kernel> {
        let entry = CString::new(entry).map_err(|_| CL_INVALID_KERNEL_NAME)?;
        unsafe { create_kernel(program, &entry) }
    }

    fn set_image_arg(&self, kernel: cl_kernel, index: u32, image: cl_mem) -> ApiResult<()> {
        unsafe {
            set_kernel_arg(
                kernel,
                index,
                std::mem::size_of::<cl_mem>(),
                &image as *const cl_mem as *const c_void,
            )
        }
    }

    fn preferred_work_group_multiple(
        &self,
        kernel: cl_kernel,
        device: cl_device_id,
    ) -> ApiResult<usize> {
        let info = unsafe {
            get_kernel_work_group_info(kernel, device, CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE)
        }?;
        let multiple: usize = info.into();
        Ok(multiple)
    }

    fn enqueue_write_image(
        &self,
        queue: cl_command_queue,
        image: cl_mem,
        width: usize,
        height: usize,
        data: &[u8],
        wait: &[cl_event],
    ) -> ApiResult<cl_event> {
        if data.len() < width * height {
            return Err(CL_INVALID_VALUE);
        }
        let (origin, region) = region(width, height);
        let (count, list) = wait_list(wait);
        unsafe {
            enqueue_write_image(
                queue,
                image,
                CL_BLOCKING,
                origin.as_ptr(),
                region.as_ptr(),
                width,
                0,
                // The write is blocking and never writes through the host pointer.
                data.as_ptr() as *mut c_void,
                count,
                list,
            )
        }
    }

    fn enqueue_kernel(
        &self,
        queue: cl_command_queue,
        kernel: cl_kernel,
        global: [usize; 2],
        local: [usize; 2],
        wait: &[cl_event],
    ) -> ApiResult<cl_event> {
        let (count, list) = wait_list(wait);
        unsafe {
            enqueue_nd_range_kernel(
                queue,
                kernel,
                2,
                ptr::null(),
                global.as_ptr(),
                local.as_ptr(),
                count,
                list,
            )
        }
    }

    fn enqueue_read_image(
        &self,
        queue: cl_command_queue,
        image: cl_mem,
        width: usize,
        height: usize,
        data: &mut [u8],
        wait: &[cl_event],
    ) -> ApiResult<cl_event> {
        if data.len() < width * height {
            return Err(CL_INVALID_VALUE);
        }
        let (origin, region) = region(width, height);
        let (count, list) = wait_list(wait);
        unsafe {
            enqueue_read_image(
                queue,
                image,
                CL_BLOCKING,
                origin.as_ptr(),
                region.as_ptr(),
                width,
                0,
                data.as_mut_ptr() as *mut c_void,
                count,
                list,
            )
        }
    }

    fn wait_for_events(&self, events: &[cl_event]) -> ApiResult<()> {
        unsafe { wait_for_events(events) }
    }

    fn profiling_times(&self, event: cl_event) -> ApiResult<EventTimes> {
        Ok(EventTimes {
            queued: profiling_value(event, CL_PROFILING_COMMAND_QUEUED)?,
            submit: profiling_value(event, CL_PROFILING_COMMAND_SUBMIT)?,
            start: profiling_value(event, CL_PROFILING_COMMAND_START)?,
            end: profiling_value(event, CL_PROFILING_COMMAND_END)?,
        })
    }

    fn release_event(&self, event: cl_event) -> ApiResult<()> {
        unsafe { release_event(event) }
    }

    fn release_image(&self, image: cl_mem) -> ApiResult<()> {
        unsafe { release_mem_object(image) }
    }

    fn release_kernel(&self, kernel: cl_kernel) -> ApiResult<()> {
        unsafe { release_kernel(kernel) }
    }

    fn release_program(&self, program: cl_program) -> ApiResult<()> {
        unsafe { release_program(program) }
    }

    fn release_queue(&self, queue: cl_command_queue) -> ApiResult<()> {
        unsafe { release_command_queue(queue) }
    }

    fn release_context(&self, context: cl_context) -> ApiResult<()> {
        unsafe { release_context(context) }
    }

    fn release_device(&self, device: cl_device_id) -> ApiResult<()> {
        unsafe { release_device(device) }
    }
}
