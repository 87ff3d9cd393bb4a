// gpu/emulated.rs — A compute device emulated on the host.
//
// `EmulatedApi` implements `ComputeApi` without any driver, so the whole
// session/dispatch path (status checks, event chaining, teardown order,
// partial-failure cleanup) runs in ordinary `cargo test`. It behaves like a
// strict OpenCL implementation:
//
//   - every handle is tracked; using or releasing a dead one fails with the
//     matching CL_INVALID_* status
//   - wait lists must name live events (CL_INVALID_EVENT_WAIT_LIST)
//   - the NDRange is validated against the kernel's image size
//   - a program only builds when it has a `__kernel` and balanced braces;
//     otherwise the build fails with a compiler-style log
//
// The `sobel` entry runs `gradient::sobel_magnitude_clamped`, which is the
// device kernel's exact semantics. Any other entry point executes as a
// no-op.
//
// State is shared between clones. A test keeps one clone, hands the other
// to a session, and inspects the ledger after the session is gone.
//
// TIMING MODEL:
// A simulated device clock (ns) advances per command:
//
//   queued = clock
//   submit = queued + latency / 2
//   start  = queued + latency
//   end    = start + pixels * ns_per_pixel
//   clock  = end
//
// so the kernel's END - QUEUED is deterministic for a given config.

use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::gpu::api::{ComputeApi, EventTimes, ImageAccess};
use crate::gpu::status::*;
use crate::gradient::sobel_magnitude_clamped;
use crate::image::Image;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Shape and timing of the emulated device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatedConfig {
    /// Installed platforms. 0 makes enumeration fail with
    /// `CL_PLATFORM_NOT_FOUND_KHR`.
    pub platforms: usize,
    /// GPU devices per platform. 0 makes enumeration fail with
    /// `CL_DEVICE_NOT_FOUND`.
    pub gpu_devices: usize,
    pub device_name: String,
    /// Answer to `CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE`.
    pub work_group_multiple: usize,
    /// QUEUED → START delay of every command.
    pub queue_latency_ns: u64,
    /// Kernel cost per pixel.
    pub kernel_ns_per_pixel: u64,
    /// Host↔device copy cost per pixel.
    pub transfer_ns_per_pixel: u64,
}

impl Default for EmulatedConfig {
    fn default() -> Self {
        Self {
            platforms: 1,
            gpu_devices: 1,
            device_name: "Emulated GPU".to_string(),
            work_group_multiple: 32,
            queue_latency_ns: 20_000,
            kernel_ns_per_pixel: 2,
            transfer_ns_per_pixel: 1,
        }
    }
}

/// Opaque emulated handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmuHandle(u64);

impl EmuHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Every entry point of `ComputeApi`, for call counting and failure
/// injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiCall {
    Platforms,
    GpuDevices,
    DeviceName,
    CreateContext,
    CreateQueue,
    CreateProgram,
    BuildProgram,
    BuildLog,
    CreateImage,
    CreateKernel,
    SetKernelArg,
    WorkGroupMultiple,
    EnqueueWrite,
    EnqueueKernel,
    EnqueueRead,
    WaitForEvents,
    ProfilingTimes,
    ReleaseEvent,
    ReleaseImage,
    ReleaseKernel,
    ReleaseProgram,
    ReleaseQueue,
    ReleaseContext,
    ReleaseDevice,
}

/// Kinds of resource in the ledger. `Device` only ever appears in the
/// release log; root devices are not reference counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Context,
    Queue,
    Program,
    Image,
    Kernel,
    Event,
    Device,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    WriteImage,
    Kernel,
    ReadImage,
}

/// One enqueued command as the device saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub event: EmuHandle,
    pub wait: Vec<EmuHandle>,
}

// ---------------------------------------------------------------------------
// Device state
// ---------------------------------------------------------------------------

const PLATFORM_BASE: u64 = 0x100;
const DEVICE_BASE: u64 = 0x200;
const OBJECT_BASE: u64 = 0x1000;

enum Object {
    Context,
    Queue,
    Program {
        source: String,
        built: bool,
        log: String,
    },
    Image {
        width: usize,
        height: usize,
        data: Vec<u8>,
    },
    Kernel {
        entry: String,
        args: [Option<u64>; 2],
    },
    Event(EventTimes),
}

impl Object {
    fn kind(&self) -> ResourceKind {
        match self {
            Object::Context => ResourceKind::Context,
            Object::Queue => ResourceKind::Queue,
            Object::Program { .. } => ResourceKind::Program,
            Object::Image { .. } => ResourceKind::Image,
            Object::Kernel { .. } => ResourceKind::Kernel,
            Object::Event(_) => ResourceKind::Event,
        }
    }
}

struct State {
    config: EmulatedConfig,
    next_id: u64,
    objects: HashMap<u64, Object>,
    calls: usize,
    per_call: HashMap<ApiCall, usize>,
    /// Pending injected failure per call: (invocations to let through, status).
    failures: HashMap<ApiCall, (usize, ClStatus)>,
    commands: Vec<Command>,
    release_log: Vec<ResourceKind>,
    clock_ns: u64,
}

impl State {
    fn insert(&mut self, object: Object) -> EmuHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, object);
        EmuHandle(id)
    }

    fn is(&self, handle: EmuHandle, kind: ResourceKind) -> bool {
        self.objects.get(&handle.0).map(Object::kind) == Some(kind)
    }

    fn require(&self, handle: EmuHandle, kind: ResourceKind, code: ClStatus) -> ApiResult<()> {
        if self.is(handle, kind) {
            Ok(())
        } else {
            Err(code)
        }
    }

    fn valid_device(&self, device: EmuHandle) -> bool {
        let devices = (self.config.platforms * self.config.gpu_devices) as u64;
        (DEVICE_BASE..DEVICE_BASE + devices).contains(&device.0)
    }

    fn remove(&mut self, handle: EmuHandle, kind: ResourceKind, code: ClStatus) -> ApiResult<()> {
        self.require(handle, kind, code)?;
        self.objects.remove(&handle.0);
        self.release_log.push(kind);
        Ok(())
    }

    fn check_wait_list(&self, wait: &[EmuHandle]) -> ApiResult<()> {
        if wait.iter().all(|&e| self.is(e, ResourceKind::Event)) {
            Ok(())
        } else {
            Err(CL_INVALID_EVENT_WAIT_LIST)
        }
    }

    /// Advance the device clock by one command costing `work_ns`.
    fn tick(&mut self, work_ns: u64) -> EventTimes {
        let latency = self.config.queue_latency_ns;
        let queued = self.clock_ns;
        let start = queued + latency;
        let times = EventTimes {
            queued,
            submit: queued + latency / 2,
            start,
            end: start + work_ns,
        };
        self.clock_ns = times.end;
        times
    }

    fn record(&mut self, kind: CommandKind, work_ns: u64, wait: &[EmuHandle]) -> EmuHandle {
        let times = self.tick(work_ns);
        let event = self.insert(Object::Event(times));
        self.commands.push(Command {
            kind,
            event,
            wait: wait.to_vec(),
        });
        event
    }

    fn image_dims(&self, image: EmuHandle) -> ApiResult<(usize, usize)> {
        match self.objects.get(&image.0) {
            Some(Object::Image { width, height, .. }) => Ok((*width, *height)),
            _ => Err(CL_INVALID_MEM_OBJECT),
        }
    }

    fn image_data(&self, image: EmuHandle) -> ApiResult<&[u8]> {
        match self.objects.get(&image.0) {
            Some(Object::Image { data, .. }) => Ok(data),
            _ => Err(CL_INVALID_MEM_OBJECT),
        }
    }

    fn image_data_mut(&mut self, image: EmuHandle) -> ApiResult<&mut Vec<u8>> {
        match self.objects.get_mut(&image.0) {
            Some(Object::Image { data, .. }) => Ok(data),
            _ => Err(CL_INVALID_MEM_OBJECT),
        }
    }
}

/// Minimal front-end check: a `__kernel` function and balanced braces.
fn compile(source: &str) -> Result<(), String> {
    let mut depth = 0i64;
    for (lineno, line) in source.lines().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            match ch {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!(
                    "<source>:{}:{}: error: extraneous closing brace ('}}')",
                    lineno + 1,
                    col + 1
                ));
            }
        }
    }
    if depth != 0 {
        let lines = source.lines().count().max(1);
        return Err(format!("<source>:{lines}:1: error: expected '}}'"));
    }
    if !source.contains("__kernel") {
        return Err("<source>:1:1: error: no __kernel function defined".to_string());
    }
    Ok(())
}

fn declares_entry(source: &str, entry: &str) -> bool {
    source.contains(&format!("void {entry}(")) || source.contains(&format!("void {entry} ("))
}

// ---------------------------------------------------------------------------
// EmulatedApi
// ---------------------------------------------------------------------------

/// Host-emulated compute device. Clones share one device.
#[derive(Clone)]
pub struct EmulatedApi {
    state: Rc<RefCell<State>>,
}

impl Default for EmulatedApi {
    fn default() -> Self {
        Self::new(EmulatedConfig::default())
    }
}

impl fmt::Debug for EmulatedApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EmulatedApi")
            .field("device", &state.config.device_name)
            .field("calls", &state.calls)
            .field("live_resources", &state.objects.len())
            .finish()
    }
}

impl EmulatedApi {
    pub fn new(config: EmulatedConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                config,
                next_id: OBJECT_BASE,
                objects: HashMap::new(),
                calls: 0,
                per_call: HashMap::new(),
                failures: HashMap::new(),
                commands: Vec::new(),
                release_log: Vec::new(),
                clock_ns: 0,
            })),
        }
    }

    pub fn config(&self) -> EmulatedConfig {
        self.state.borrow().config.clone()
    }

    /// Make the next invocation of `call` fail with `status`.
    pub fn fail_next(&self, call: ApiCall, status: ClStatus) {
        self.fail_after(call, 0, status);
    }

    /// Let `skip` invocations of `call` succeed, then fail the one after
    /// with `status`.
    pub fn fail_after(&self, call: ApiCall, skip: usize, status: ClStatus) {
        self.state.borrow_mut().failures.insert(call, (skip, status));
    }

    /// Total device calls issued so far.
    pub fn calls(&self) -> usize {
        self.state.borrow().calls
    }

    pub fn call_count(&self, call: ApiCall) -> usize {
        self.state.borrow().per_call.get(&call).copied().unwrap_or(0)
    }

    /// Resources created and not yet released.
    pub fn live_resources(&self) -> usize {
        self.state.borrow().objects.len()
    }

    pub fn live(&self, kind: ResourceKind) -> usize {
        self.state
            .borrow()
            .objects
            .values()
            .filter(|o| o.kind() == kind)
            .count()
    }

    /// Every command enqueued so far, in submission order.
    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    /// Kinds of every successful release, in order.
    pub fn release_log(&self) -> Vec<ResourceKind> {
        self.state.borrow().release_log.clone()
    }

    /// Current simulated device time in ns.
    pub fn clock_ns(&self) -> u64 {
        self.state.borrow().clock_ns
    }

    fn begin(&self, call: ApiCall) -> ApiResult<RefMut<'_, State>> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        *state.per_call.entry(call).or_insert(0) += 1;
        match state.failures.get_mut(&call) {
            Some((0, code)) => {
                let code = *code;
                state.failures.remove(&call);
                Err(code)
            }
            Some((skip, _)) => {
                *skip -= 1;
                Ok(state)
            }
            None => Ok(state),
        }
    }
}

impl ComputeApi for EmulatedApi {
    type Platform = EmuHandle;
    type Device = EmuHandle;
    type Context = EmuHandle;
    type Queue = EmuHandle;
    type Program = EmuHandle;
    type Kernel = EmuHandle;
    type Image = EmuHandle;
    type Event = EmuHandle;

    fn platforms(&self) -> ApiResult<Vec<EmuHandle>> {
        let state = self.begin(ApiCall::Platforms)?;
        if state.config.platforms == 0 {
            return Err(CL_PLATFORM_NOT_FOUND_KHR);
        }
        Ok((0..state.config.platforms as u64)
            .map(|i| EmuHandle(PLATFORM_BASE + i))
            .collect())
    }

    fn gpu_devices(&self, platform: EmuHandle) -> ApiResult<Vec<EmuHandle>> {
        let state = self.begin(ApiCall::GpuDevices)?;
        let index = platform.0.wrapping_sub(PLATFORM_BASE);
        if index >= state.config.platforms as u64 {
            return Err(CL_INVALID_PLATFORM);
        }
        let per_platform = state.config.gpu_devices as u64;
        if per_platform == 0 {
            return Err(CL_DEVICE_NOT_FOUND);
        }
        let first = DEVICE_BASE + index * per_platform;
        Ok((first..first + per_platform).map(EmuHandle).collect())
    }

    fn device_name(&self, device: EmuHandle) -> ApiResult<String> {
        let state = self.begin(ApiCall::DeviceName)?;
        if !state.valid_device(device) {
            return Err(CL_INVALID_DEVICE);
        }
        let index = device.0 - DEVICE_BASE;
        Ok(if index == 0 {
            state.config.device_name.clone()
        } else {
            format!("{} #{index}", state.config.device_name)
        })
    }

    fn create_context(&self, device: EmuHandle) -> ApiResult<EmuHandle> {
        let mut state = self.begin(ApiCall::CreateContext)?;
        if !state.valid_device(device) {
            return Err(CL_INVALID_DEVICE);
        }
        Ok(state.insert(Object::Context))
    }

    fn create_profiling_queue(&self, context: EmuHandle, device: EmuHandle) -> ApiResult<EmuHandle> {
        let mut state = self.begin(ApiCall::CreateQueue)?;
        state.require(context, ResourceKind::Context, CL_INVALID_CONTEXT)?;
        if !state.valid_device(device) {
            return Err(CL_INVALID_DEVICE);
        }
        Ok(state.insert(Object::Queue))
    }

    fn create_program(&self, context: EmuHandle, source: &str) -> ApiResult<EmuHandle> {
        let mut state = self.begin(ApiCall::CreateProgram)?;
        state.require(context, ResourceKind::Context, CL_INVALID_CONTEXT)?;
        if source.is_empty() {
            return Err(CL_INVALID_VALUE);
        }
        Ok(state.insert(Object::Program {
            source: source.to_string(),
            built: false,
            log: String::new(),
        }))
    }

    fn build_program(&self, program: EmuHandle, devices: &[EmuHandle], _options: &str) -> ApiResult<()> {
        let mut state = self.begin(ApiCall::BuildProgram)?;
        if !devices.iter().all(|&d| state.valid_device(d)) {
            return Err(CL_INVALID_DEVICE);
        }
        match state.objects.get_mut(&program.0) {
            Some(Object::Program { source, built, log }) => match compile(source) {
                Ok(()) => {
                    *built = true;
                    log.clear();
                    Ok(())
                }
                Err(message) => {
                    *built = false;
                    *log = message;
                    Err(CL_BUILD_PROGRAM_FAILURE)
                }
            },
            _ => Err(CL_INVALID_PROGRAM),
        }
    }

    fn build_log(&self, program: EmuHandle, device: EmuHandle) -> ApiResult<String> {
        let state = self.begin(ApiCall::BuildLog)?;
        if !state.valid_device(device) {
            return Err(CL_INVALID_DEVICE);
        }
        match state.objects.get(&program.0) {
            Some(Object::Program { log, .. }) => Ok(log.clone()),
            _ => Err(CL_INVALID_PROGRAM),
        }
    }

    fn create_image(
        &self,
        context: EmuHandle,
        _access: ImageAccess,
        width: usize,
        height: usize,
    ) -> ApiResult<EmuHandle> {
        let mut state = self.begin(ApiCall::CreateImage)?;
        state.require(context, ResourceKind::Context, CL_INVALID_CONTEXT)?;
        if width == 0 || height == 0 {
            return Err(CL_INVALID_IMAGE_SIZE);
        }
        Ok(state.insert(Object::Image {
            width,
            height,
            data: vec![0; width * height],
        }))
    }

    fn create_kernel(&self, program: EmuHandle, entry: &str) -> ApiResult<EmuHandle> {
        let mut state = self.begin(ApiCall::CreateKernel)?;
        let entry_ok = match state.objects.get(&program.0) {
            Some(Object::Program { built: false, .. }) => return Err(CL_INVALID_PROGRAM_EXECUTABLE),
            Some(Object::Program { source, .. }) => declares_entry(source, entry),
            _ => return Err(CL_INVALID_PROGRAM),
        };
        if !entry_ok {
            return Err(CL_INVALID_KERNEL_NAME);
        }
        Ok(state.insert(Object::Kernel {
            entry: entry.to_string(),
            args: [None; 2],
        }))
    }

    fn set_image_arg(&self, kernel: EmuHandle, index: u32, image: EmuHandle) -> ApiResult<()> {
        let mut state = self.begin(ApiCall::SetKernelArg)?;
        state.require(image, ResourceKind::Image, CL_INVALID_MEM_OBJECT)?;
        match state.objects.get_mut(&kernel.0) {
            Some(Object::Kernel { args, .. }) => {
                let slot = args.get_mut(index as usize).ok_or(CL_INVALID_ARG_INDEX)?;
                *slot = Some(image.0);
                Ok(())
            }
            _ => Err(CL_INVALID_KERNEL),
        }
    }

    fn preferred_work_group_multiple(&self, kernel: EmuHandle, device: EmuHandle) -> ApiResult<usize> {
        let state = self.begin(ApiCall::WorkGroupMultiple)?;
        state.require(kernel, ResourceKind::Kernel, CL_INVALID_KERNEL)?;
        if !state.valid_device(device) {
            return Err(CL_INVALID_DEVICE);
        }
        Ok(state.config.work_group_multiple)
    }

    fn enqueue_write_image(
        &self,
        queue: EmuHandle,
        image: EmuHandle,
        width: usize,
        height: usize,
        data: &[u8],
        wait: &[EmuHandle],
    ) -> ApiResult<EmuHandle> {
        let mut state = self.begin(ApiCall::EnqueueWrite)?;
        state.require(queue, ResourceKind::Queue, CL_INVALID_COMMAND_QUEUE)?;
        state.check_wait_list(wait)?;
        if state.image_dims(image)? != (width, height) || data.len() < width * height {
            return Err(CL_INVALID_VALUE);
        }
        state.image_data_mut(image)?.copy_from_slice(&data[..width * height]);
        let cost = (width * height) as u64 * state.config.transfer_ns_per_pixel;
        Ok(state.record(CommandKind::WriteImage, cost, wait))
    }

    fn enqueue_kernel(
        &self,
        queue: EmuHandle,
        kernel: EmuHandle,
        global: [usize; 2],
        local: [usize; 2],
        wait: &[EmuHandle],
    ) -> ApiResult<EmuHandle> {
        let mut state = self.begin(ApiCall::EnqueueKernel)?;
        state.require(queue, ResourceKind::Queue, CL_INVALID_COMMAND_QUEUE)?;
        state.check_wait_list(wait)?;

        let (entry, input, output) = match state.objects.get(&kernel.0) {
            Some(Object::Kernel { entry, args: [Some(i), Some(o)] }) => {
                (entry.clone(), EmuHandle(*i), EmuHandle(*o))
            }
            Some(Object::Kernel { .. }) => return Err(CL_INVALID_KERNEL_ARGS),
            _ => return Err(CL_INVALID_KERNEL),
        };
        let (width, height) = state.image_dims(input)?;
        if state.image_dims(output)? != (width, height) {
            return Err(CL_INVALID_IMAGE_SIZE);
        }

        if local.iter().any(|&l| l == 0) || global[0] % local[0] != 0 || global[1] % local[1] != 0 {
            return Err(CL_INVALID_WORK_GROUP_SIZE);
        }
        if global[0] < width || global[1] < height {
            return Err(CL_INVALID_GLOBAL_WORK_SIZE);
        }

        if entry == "sobel" {
            let src = Image::from_vec(width, height, state.image_data(input)?.to_vec());
            let filtered = sobel_magnitude_clamped(&src).into_vec();
            *state.image_data_mut(output)? = filtered;
        }

        let cost = (global[0] * global[1]) as u64 * state.config.kernel_ns_per_pixel;
        Ok(state.record(CommandKind::Kernel, cost, wait))
    }

    fn enqueue_read_image(
        &self,
        queue: EmuHandle,
        image: EmuHandle,
        width: usize,
        height: usize,
        data: &mut [u8],
        wait: &[EmuHandle],
    ) -> ApiResult<EmuHandle> {
        let mut state = self.begin(ApiCall::EnqueueRead)?;
        state.require(queue, ResourceKind::Queue, CL_INVALID_COMMAND_QUEUE)?;
        state.check_wait_list(wait)?;
        if state.image_dims(image)? != (width, height) || data.len() < width * height {
            return Err(CL_INVALID_VALUE);
        }
        data[..width * height].copy_from_slice(state.image_data(image)?);
        let cost = (width * height) as u64 * state.config.transfer_ns_per_pixel;
        Ok(state.record(CommandKind::ReadImage, cost, wait))
    }

    fn wait_for_events(&self, events: &[EmuHandle]) -> ApiResult<()> {
        let state = self.begin(ApiCall::WaitForEvents)?;
        if events.is_empty() {
            return Err(CL_INVALID_VALUE);
        }
        if events.iter().all(|&e| state.is(e, ResourceKind::Event)) {
            Ok(())
        } else {
            Err(CL_INVALID_EVENT)
        }
    }

    fn profiling_times(&self, event: EmuHandle) -> ApiResult<EventTimes> {
        let state = self.begin(ApiCall::ProfilingTimes)?;
        match state.objects.get(&event.0) {
            Some(Object::Event(times)) => Ok(*times),
            _ => Err(CL_INVALID_EVENT),
        }
    }

    fn release_event(&self, event: EmuHandle) -> ApiResult<()> {
        self.begin(ApiCall::ReleaseEvent)?
            .remove(event, ResourceKind::Event, CL_INVALID_EVENT)
    }

    fn release_image(&self, image: EmuHandle) -> ApiResult<()> {
        self.begin(ApiCall::ReleaseImage)?
            .remove(image, ResourceKind::Image, CL_INVALID_MEM_OBJECT)
    }

    fn release_kernel(&self, kernel: EmuHandle) -> ApiResult<()> {
        self.begin(ApiCall::ReleaseKernel)?
            .remove(kernel, ResourceKind::Kernel, CL_INVALID_KERNEL)
    }

    fn release_program(&self, program: EmuHandle) -> ApiResult<()> {
        self.begin(ApiCall::ReleaseProgram)?
            .remove(program, ResourceKind::Program, CL_INVALID_PROGRAM)
    }

    fn release_queue(&self, queue: EmuHandle) -> ApiResult<()> {
        self.begin(ApiCall::ReleaseQueue)?
            .remove(queue, ResourceKind::Queue, CL_INVALID_COMMAND_QUEUE)
    }

    fn release_context(&self, context: EmuHandle) -> ApiResult<()> {
        self.begin(ApiCall::ReleaseContext)?
            .remove(context, ResourceKind::Context, CL_INVALID_CONTEXT)
    }

    fn release_device(&self, device: EmuHandle) -> ApiResult<()> {
        let mut state = self.begin(ApiCall::ReleaseDevice)?;
        if !state.valid_device(device) {
            return Err(CL_INVALID_DEVICE);
        }
        state.release_log.push(ResourceKind::Device);
        Ok(())
    }
}
